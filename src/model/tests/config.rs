use crate::model::{ConfigError, ModelConfig, TransformKind};

#[test]
fn test_transform_kind_selectors() {
    assert_eq!("mlp".parse::<TransformKind>().unwrap(), TransformKind::Linear);
    assert_eq!("Linear".parse::<TransformKind>().unwrap(), TransformKind::Linear);
    assert_eq!("gcn".parse::<TransformKind>().unwrap(), TransformKind::Gcn);
    assert_eq!("GraphConv".parse::<TransformKind>().unwrap(), TransformKind::GraphConv);
    assert_eq!("graph_conv".parse::<TransformKind>().unwrap(), TransformKind::GraphConv);
    assert_eq!(" gat ".parse::<TransformKind>().unwrap(), TransformKind::Gat);
    assert!(matches!(
        "sage".parse::<TransformKind>(),
        Err(ConfigError::UnknownTransformKind(s)) if s == "sage"
    ));
}

#[test]
fn test_transform_kind_json() {
    let kind: TransformKind = serde_json::from_str("\"mlp\"").unwrap();
    assert_eq!(kind, TransformKind::Linear);
    assert_eq!(serde_json::to_string(&TransformKind::GraphConv).unwrap(), "\"graph_conv\"");
    assert!(serde_json::from_str::<TransformKind>("\"transformer\"").is_err());
}

#[test]
fn test_partial_model_config_json_uses_defaults() {
    let config: ModelConfig = serde_json::from_str(r#"{"kind": "gat", "hidden_dim": 8}"#).unwrap();
    assert_eq!(config.kind, TransformKind::Gat);
    assert_eq!(config.hidden_dim, 8);
    assert_eq!(config.in_dim, 1433);
    assert_eq!(config.num_layers, 2);
}

#[test]
fn test_layer_dims() {
    let config = ModelConfig::new(TransformKind::Gcn, 10, 4, 3);
    assert_eq!(config.layer_dims(), vec![(10, 4), (4, 3)]);
    assert_eq!(config.clone().with_layers(1).layer_dims(), vec![(10, 3)]);
    assert_eq!(
        config.with_layers(3).layer_dims(),
        vec![(10, 4), (4, 4), (4, 3)]
    );
}

#[test]
fn test_validate() {
    let ok = ModelConfig::new(TransformKind::Linear, 10, 4, 3);
    assert!(ok.validate().is_ok());
    assert!(ok.clone().with_layers(0).validate().is_err());
    assert!(ok.clone().with_dropout(1.0).validate().is_err());
    assert!(ModelConfig::new(TransformKind::Linear, 0, 4, 3).validate().is_err());
    // 单层模型不需要隐藏宽度
    assert!(ModelConfig::new(TransformKind::Linear, 10, 0, 3)
        .with_layers(1)
        .validate()
        .is_ok());
}
