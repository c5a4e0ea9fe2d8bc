use super::{AttributeRestriction, LayoutParameter, LayoutSettings, ParameterKind, ParameterValue};
use crate::config::LayoutConfig;
use crate::error::{ValidationError, ValidationReason};
use graphwerk_graph::{FieldStats, Graph, ItemType};
use tracing::trace;

/// Settings holding the default value of every parameter that has one
///
/// Attribute parameters have no default and are left unset.
pub fn defaults(parameters: &[LayoutParameter]) -> LayoutSettings {
    parameters
        .iter()
        .filter_map(|parameter| Some((parameter.id.clone(), parameter.kind.default_value()?)))
        .collect()
}

/// Complete and check user-provided settings against a parameter list
///
/// Values missing from `partial` are filled with defaults. The first
/// offending parameter is reported, unknown ids before declared ones.
pub fn validate(
    parameters: &[LayoutParameter],
    graph: &dyn Graph,
    partial: &LayoutSettings,
    config: &LayoutConfig,
) -> Result<LayoutSettings, ValidationError> {
    if let Some(unknown) = partial
        .keys()
        .find(|id| !parameters.iter().any(|parameter| &parameter.id == *id))
    {
        return Err(ValidationError::new(
            unknown,
            ValidationReason::UnknownParameter,
        ));
    }

    let mut settings = LayoutSettings::new();
    for parameter in parameters {
        let value = partial
            .get(&parameter.id)
            .cloned()
            .or_else(|| parameter.kind.default_value());
        let Some(value) = value else {
            if parameter.required {
                return Err(ValidationError::new(&parameter.id, ValidationReason::Missing));
            }
            continue;
        };

        check_value(parameter, &value, graph, config)
            .map_err(|reason| ValidationError::new(&parameter.id, reason))?;
        trace!("Parameter {} accepted: {value:?}", parameter.id);
        settings.insert(parameter.id.clone(), value);
    }

    Ok(settings)
}

fn check_value(
    parameter: &LayoutParameter,
    value: &ParameterValue,
    graph: &dyn Graph,
    config: &LayoutConfig,
) -> Result<(), ValidationReason> {
    match (&parameter.kind, value) {
        (ParameterKind::Boolean { .. }, ParameterValue::Boolean(_)) => Ok(()),
        (ParameterKind::Number(number), ParameterValue::Number(n)) => number.check(*n),
        (
            ParameterKind::Attribute {
                item_type,
                restriction,
            },
            ParameterValue::Attribute(field),
        ) => check_attribute(graph, *item_type, *restriction, field, config),
        (ParameterKind::Script(script), ParameterValue::Script(function)) => script
            .check
            .run(function, graph, &config.script)
            .map_err(ValidationReason::Script),
        (kind, value) => Err(ValidationReason::TypeMismatch {
            expected: kind.name(),
            found: value.kind_name(),
        }),
    }
}

fn check_attribute(
    graph: &dyn Graph,
    item_type: ItemType,
    restriction: Option<AttributeRestriction>,
    field: &str,
    config: &LayoutConfig,
) -> Result<(), ValidationReason> {
    let stats = FieldStats::sample(graph, item_type, field, config.validation.sample_size);
    if !stats.exists() {
        return Err(ValidationReason::UnknownAttribute {
            item_type,
            field: field.to_string(),
        });
    }

    let matches = match restriction {
        None => true,
        Some(AttributeRestriction::Quantitative) => stats.is_quantitative(),
        Some(AttributeRestriction::Qualitative) => {
            stats.is_qualitative(config.validation.qualitative_max_distinct)
        }
    };
    match restriction {
        Some(restriction) if !matches => Err(ValidationReason::RestrictionMismatch {
            field: field.to_string(),
            restriction,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::NumberParameter;
    use crate::script::{ScriptFunction, ScriptValidationError};
    use graphwerk_graph::{DataGraph, ItemData, Scalar};
    use test_log::test;

    fn graph() -> DataGraph {
        let mut graph = DataGraph::new();
        let labels = ["alpha", "beta", "gamma"];
        for (i, label) in labels.iter().enumerate() {
            let mut data = ItemData::new();
            data.insert("label".into(), Scalar::from(*label));
            data.insert("degree".into(), Scalar::from(i as f64));
            graph.add_node(format!("n{i}"), data).unwrap();
        }
        let mut data = ItemData::new();
        data.insert("weight".into(), Scalar::from("0.5"));
        graph.add_edge("e0", "n0", "n1", data).unwrap();
        graph
    }

    fn parameters() -> Vec<LayoutParameter> {
        vec![
            LayoutParameter::number("param", NumberParameter::new(5.0).min(0.0).max(10.0)),
            LayoutParameter::boolean("flag", true),
            LayoutParameter::attribute(
                "size",
                ItemType::Nodes,
                Some(AttributeRestriction::Quantitative),
            ),
        ]
    }

    #[test]
    fn empty_settings_get_defaults() {
        let settings = validate(
            &parameters(),
            &graph(),
            &LayoutSettings::new(),
            &LayoutConfig::default(),
        )
        .unwrap();
        assert_eq!(settings.number("param"), Some(5.0));
        assert_eq!(settings.boolean("flag"), Some(true));
        assert_eq!(settings.attribute("size"), None);
        assert_eq!(settings.len(), 2);
    }

    #[test]
    fn out_of_bounds_number_names_the_parameter() {
        let err = validate(
            &parameters(),
            &graph(),
            &LayoutSettings::new().with("param", 15.0),
            &LayoutConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.parameter, "param");
        assert!(matches!(err.reason, ValidationReason::OutOfBounds { .. }));
    }

    #[test]
    fn quantitative_attribute_rejects_words() {
        let partial = LayoutSettings::new().with("size", ParameterValue::Attribute("label".into()));
        let err = validate(&parameters(), &graph(), &partial, &LayoutConfig::default()).unwrap_err();
        assert_eq!(err.parameter, "size");
        assert_eq!(
            err.reason,
            ValidationReason::RestrictionMismatch {
                field: "label".into(),
                restriction: AttributeRestriction::Quantitative,
            }
        );

        let partial = LayoutSettings::new().with("size", ParameterValue::Attribute("degree".into()));
        let settings = validate(&parameters(), &graph(), &partial, &LayoutConfig::default()).unwrap();
        assert_eq!(settings.attribute("size"), Some("degree"));
    }

    #[test]
    fn attributes_are_looked_up_on_the_declared_item_type() {
        let parameters = vec![LayoutParameter::attribute(
            "weight",
            ItemType::Nodes,
            None,
        )];
        let partial = LayoutSettings::new().with("weight", ParameterValue::Attribute("weight".into()));
        let err = validate(&parameters, &graph(), &partial, &LayoutConfig::default()).unwrap_err();
        assert_eq!(
            err.reason,
            ValidationReason::UnknownAttribute {
                item_type: ItemType::Nodes,
                field: "weight".into(),
            }
        );
    }

    #[test]
    fn qualitative_restriction_uses_distinct_count() {
        let parameters = vec![LayoutParameter::attribute(
            "group",
            ItemType::Nodes,
            Some(AttributeRestriction::Qualitative),
        )];
        let partial = LayoutSettings::new().with("group", ParameterValue::Attribute("label".into()));
        let mut config = LayoutConfig::default();
        assert!(validate(&parameters, &graph(), &partial, &config).is_ok());

        config.validation.qualitative_max_distinct = 2;
        assert!(validate(&parameters, &graph(), &partial, &config).is_err());
    }

    #[test]
    fn required_attribute_must_be_provided() {
        let parameters = vec![LayoutParameter::attribute("size", ItemType::Nodes, None).required()];
        let err = validate(
            &parameters,
            &graph(),
            &LayoutSettings::new(),
            &LayoutConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::new("size", ValidationReason::Missing));
    }

    #[test]
    fn unknown_ids_and_kind_mismatches_are_rejected() {
        let err = validate(
            &parameters(),
            &graph(),
            &LayoutSettings::new().with("nope", 1.0),
            &LayoutConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.parameter, "nope");
        assert_eq!(err.reason, ValidationReason::UnknownParameter);

        let err = validate(
            &parameters(),
            &graph(),
            &LayoutSettings::new().with("flag", 1.0),
            &LayoutConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err.reason,
            ValidationReason::TypeMismatch {
                expected: "boolean",
                found: "number",
            }
        );
    }

    #[test]
    fn scripts_go_through_their_check() {
        let parameters = vec![LayoutParameter::script(
            "script",
            ScriptFunction::new("function (id, attributes, index) { return { x: index, y: 0 }; }"),
            "",
        )];
        let settings = validate(
            &parameters,
            &graph(),
            &LayoutSettings::new(),
            &LayoutConfig::default(),
        )
        .unwrap();
        assert!(settings.script("script").is_some());

        let partial = LayoutSettings::new().with("script", ScriptFunction::new("42"));
        let err = validate(&parameters, &graph(), &partial, &LayoutConfig::default()).unwrap_err();
        assert_eq!(
            err.reason,
            ValidationReason::Script(ScriptValidationError::NotAFunction)
        );
    }

    #[test]
    fn defaults_skip_attributes() {
        let settings = defaults(&parameters());
        assert_eq!(settings.keys().collect::<Vec<_>>(), ["flag", "param"]);
    }
}
