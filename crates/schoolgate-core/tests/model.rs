#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use schoolgate_core::{Entitlement, GateError, Identity, Principal, Role, RoleRecord, SchemaName};

#[test]
fn roles_parse_from_directory_strings() {
    for role in Role::ALL {
        assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
    }
    let err = "ADMIN".parse::<Role>().expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "ROLE_INVALID");
}

#[test]
fn schema_names_reject_filter_metacharacters() {
    assert!(SchemaName::parse("escola_00000001").is_ok());
    for bad in ["", "Escola", "escola,x", "escola)", "1escola", "a.b", "a b"] {
        assert!(SchemaName::parse(bad).is_err(), "{bad:?} must be rejected");
    }
    assert!(SchemaName::parse("a".repeat(64)).is_err());
}

#[test]
fn entitlement_drops_invalid_and_dedups() {
    let ent = Entitlement::from_raw(["escola_2", "escola_1", "escola_1", "bad,name"]);
    assert_eq!(ent.names(), vec!["escola_1", "escola_2"]);
    assert!(ent.contains("escola_2"));
    assert!(!ent.contains("bad,name"));
}

#[test]
fn principal_from_record() {
    let identity = Identity {
        user_id: "u1".into(),
        email: Some("diretora@escola.br".into()),
    };
    let record = RoleRecord {
        role_type: "DIRETORIA".into(),
        allowed_schemas: Some(vec!["escola_00000001".into()]),
    };
    let p = Principal::from_record(identity.clone(), record).unwrap();
    assert_eq!(p.role, Role::Diretoria);
    assert_eq!(p.entitlement.names(), vec!["escola_00000001"]);

    let no_schemas = RoleRecord {
        role_type: "SEC_SEG_PUB".into(),
        allowed_schemas: None,
    };
    let p = Principal::from_record(identity.clone(), no_schemas).unwrap();
    assert!(p.entitlement.is_empty());

    let invalid = RoleRecord {
        role_type: "ALUNO".into(),
        allowed_schemas: None,
    };
    match Principal::from_record(identity, invalid) {
        Err(GateError::RoleInvalid(r)) => assert_eq!(r, "ALUNO"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn entitlement_serializes_as_json_array() {
    let ent = Entitlement::from_raw(["escola_b", "escola_a"]);
    assert_eq!(
        serde_json::to_string(&ent).unwrap(),
        r#"["escola_a","escola_b"]"#
    );
}
