use credit_rank_core::{
    config::{CascadePolicy, EngineConfig, OvershootPolicy},
    engine::CreditEngine,
    error::ErrorKind,
    participant::Role,
    rank::RankDefinition,
};

fn data_file() -> String {
    format!("{}/../data/engine_config.json", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn shipped_config_matches_standard_ladder() {
    let loaded = EngineConfig::load(&data_file()).expect("data/engine_config.json loads");
    assert_eq!(loaded, EngineConfig::standard());
}

#[test]
fn optional_sections_default() {
    let config = EngineConfig::from_json(
        r#"{ "ranks": [ { "id": "ONLY", "display_name": "Only", "target_cc": 1.0, "next_rank_id": null } ] }"#,
    )
    .unwrap();

    assert_eq!(config.valuation.retail_divisor, 346.0);
    assert_eq!(config.valuation.wholesale_divisor, 242.0);
    assert!(config.role_mappings.is_empty());
    assert_eq!(config.promotion.cascade, CascadePolicy::SingleStep);
    assert_eq!(config.promotion.overshoot, OvershootPolicy::HardReset);
    assert!(CreditEngine::build(config).is_ok());
}

#[test]
fn missing_file_is_an_error() {
    let err = EngineConfig::load("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("Cannot read"));
}

#[test]
fn zero_divisor_fails_build() {
    let mut config = EngineConfig::standard();
    config.valuation.wholesale_divisor = 0.0;

    let err = CreditEngine::build(config).err().expect("build should fail");
    assert_eq!(err.kind(), ErrorKind::InvalidConfig);
}

#[test]
fn cyclic_ladder_fails_build() {
    let mut config = EngineConfig::standard();
    config.ranks.push(RankDefinition {
        id: "LOOP".into(),
        display_name: "Loop".into(),
        target_cc: 1.0,
        next_rank_id: Some("LOOP".into()),
    });

    let err = CreditEngine::build(config).err().expect("build should fail");
    assert_eq!(err.kind(), ErrorKind::InvalidRankTable);
}

#[test]
fn role_mapping_to_missing_rank_fails_build() {
    let mut config = EngineConfig::standard();
    config.role_mappings[0].rank_id = "GONE".into();

    let err = CreditEngine::build(config).err().expect("build should fail");
    assert_eq!(err.kind(), ErrorKind::InvalidRoleMapping);
}

#[test]
fn custom_mapping_is_used_by_engine() {
    let mut config = EngineConfig::standard();
    config.role_mappings[0].role = Role::Admin;
    let engine = CreditEngine::build(config).unwrap();

    let p = engine.enroll("fbo-x", Role::Student);
    let out = engine.credit(&p, 2.0).unwrap();

    assert_eq!(out.participant.role, Role::Admin);
}
