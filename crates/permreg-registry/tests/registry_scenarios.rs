//! End-to-end scenarios against the registry handle: the authority
//! hierarchy, rotation, operator management, scope checks and the
//! mutation log.

use permreg_core::{AccountId, Caller};
use permreg_registry::{
    ErrorKind, Mutation, OperatorAuthorization, PrimaryKeys, Registry, RegistryError,
};

fn id(byte: u8) -> AccountId {
    AccountId::from_bytes([byte; 20])
}

fn caller(byte: u8) -> Caller {
    Caller::authenticated(id(byte))
}

const VNF: u8 = 0xa0;
const P: u8 = 0x01;
const K: u8 = 0x02;
const R1: u8 = 0x03;
const O: u8 = 0x10;

/// Root VNF, primary P with permissioning K and rotation R1, P holding
/// `transactions:write`, operator O mapped to P.
fn onboarded() -> Registry {
    let reg = Registry::initialize(&caller(VNF)).unwrap();
    reg.add_primary(&caller(VNF), id(P), id(K), id(R1)).unwrap();
    reg.add_address_scope(&caller(VNF), id(P), "transactions:write").unwrap();
    reg.add_operator_key(&caller(K), id(P), id(O)).unwrap();
    reg
}

#[test]
fn onboarding_rotation_and_replay() {
    let reg = onboarded();
    assert_eq!(reg.check_operator(&id(O)), Ok(id(P)));

    reg.rotate_permissioning(&caller(R1), id(P), id(0x04), id(0x05)).unwrap();
    assert_eq!(reg.primary_keys(&id(P)), Some(PrimaryKeys::new(id(0x04), id(0x05))));
    assert_eq!(reg.lookup_primary(&id(O)), Some(id(P)));
    assert_eq!(reg.check_operator(&id(O)), Ok(id(P)));

    let replay = reg
        .rotate_permissioning(&caller(R1), id(P), id(0x06), id(0x07))
        .unwrap_err();
    assert_eq!(replay, RegistryError::NotRotationKey);
    assert_eq!(replay.to_string(), "Permissions: caller is not rotation key");
    assert_eq!(reg.primary_keys(&id(P)), Some(PrimaryKeys::new(id(0x04), id(0x05))));
}

#[test]
fn rotation_chain_consumes_each_key_once() {
    let reg = onboarded();
    reg.rotate_permissioning(&caller(R1), id(P), id(0x04), id(0x05)).unwrap();
    reg.rotate_permissioning(&caller(0x05), id(P), id(0x06), id(0x07)).unwrap();
    for spent in [R1, 0x05] {
        assert_eq!(
            reg.rotate_permissioning(&caller(spent), id(P), id(0x08), id(0x09)),
            Err(RegistryError::NotRotationKey)
        );
    }
    reg.rotate_permissioning(&caller(0x07), id(P), id(0x08), id(0x09)).unwrap();
}

#[test]
fn only_root_rotates_vnf_and_adds_primaries() {
    let reg = onboarded();
    for outsider in [P, K, R1, O, 0x77] {
        let err = reg.rotate_vnf(&caller(outsider), id(0x77)).unwrap_err();
        assert_eq!(err.to_string(), "Permissions: caller is not VNF");
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert_eq!(
            reg.add_primary(&caller(outsider), id(0x30), id(0x31), id(0x32)),
            Err(RegistryError::NotRootAuthority)
        );
    }
    assert_eq!(reg.root_authority(), id(VNF));
}

#[test]
fn null_arguments_are_rejected() {
    let reg = onboarded();
    let zero = AccountId::ZERO;
    let expect_zero = |result: Result<_, RegistryError>| {
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Permissions: address is 0 address");
        assert_eq!(err.kind(), ErrorKind::Validation);
    };
    expect_zero(reg.rotate_vnf(&caller(VNF), zero));
    expect_zero(reg.add_primary(&caller(VNF), zero, id(K), id(R1)));
    expect_zero(reg.add_operator_key(&caller(K), id(P), zero));
    expect_zero(reg.rotate_operator_key(&caller(K), id(P), zero, id(O)));
    assert_eq!(reg.lookup_primary(&id(O)), Some(id(P)));
}

#[test]
fn rotate_vnf_hands_over_every_root_right() {
    let reg = onboarded();
    reg.rotate_vnf(&caller(VNF), id(0xa1)).unwrap();
    assert_eq!(reg.root_authority(), id(0xa1));
    assert!(reg.add_address_scope(&caller(VNF), id(P), "x").is_err());
    assert!(reg.rotate_vnf(&caller(VNF), id(VNF)).is_err());
    reg.add_address_scope(&caller(0xa1), id(P), "x").unwrap();
    reg.add_primary(&caller(0xa1), id(0x30), id(0x31), id(0x32)).unwrap();
    assert_eq!(reg.get_primaries(), vec![id(P), id(0x30)]);
}

#[test]
fn re_registering_a_primary_overwrites_keys() {
    let reg = onboarded();
    reg.add_primary(&caller(VNF), id(0x30), id(0x31), id(0x32)).unwrap();
    reg.add_primary(&caller(VNF), id(P), id(0x0b), id(0x0c)).unwrap();
    assert_eq!(reg.get_primaries(), vec![id(P), id(0x30)]);
    assert_eq!(reg.primary_keys(&id(P)), Some(PrimaryKeys::new(id(0x0b), id(0x0c))));
    assert_eq!(
        reg.add_operator_key(&caller(K), id(P), id(0x11)),
        Err(RegistryError::NotPermissioningKey)
    );
    assert_eq!(reg.check_operator(&id(O)), Ok(id(P)));
}

#[test]
fn operator_uniqueness_across_primaries() {
    let reg = onboarded();
    reg.add_primary(&caller(VNF), id(0x20), id(0x21), id(0x22)).unwrap();

    let err = reg.add_operator_key(&caller(0x21), id(0x20), id(O)).unwrap_err();
    assert_eq!(err.to_string(), "Permissions: operator is already mapped to a primary");
    assert_eq!(err.kind(), ErrorKind::Conflict);

    reg.add_operator_key(&caller(0x21), id(0x20), id(0x12)).unwrap();
    let before = (reg.lookup_primary(&id(O)), reg.lookup_primary(&id(0x12)));
    let seq = reg.sequence();
    assert!(matches!(
        reg.rotate_operator_key(&caller(K), id(P), id(0x12), id(O)),
        Err(RegistryError::OperatorAlreadyMapped { .. })
    ));
    assert_eq!((reg.lookup_primary(&id(O)), reg.lookup_primary(&id(0x12))), before);
    assert_eq!(reg.sequence(), seq);
}

#[test]
fn moving_an_operator_requires_clearing_first() {
    let reg = onboarded();
    reg.add_primary(&caller(VNF), id(0x20), id(0x21), id(0x22)).unwrap();
    reg.remove_operator_key(&caller(K), id(P), id(O)).unwrap();
    reg.add_operator_key(&caller(0x21), id(0x20), id(O)).unwrap();
    assert_eq!(reg.lookup_primary(&id(O)), Some(id(0x20)));
}

#[test]
fn operator_rotation_and_removal() {
    let reg = onboarded();
    reg.rotate_operator_key(&caller(K), id(P), id(0x11), id(O)).unwrap();
    assert_eq!(reg.lookup_primary(&id(O)), None);
    assert_eq!(reg.check_operator(&id(0x11)), Ok(id(P)));

    let err = reg.check_operator(&id(O)).unwrap_err();
    assert_eq!(err.to_string(), "Permissions: operator not pointing to a primary");
    assert_eq!(err.kind(), ErrorKind::NotFound);

    reg.remove_operator_key(&caller(K), id(P), id(0x11)).unwrap();
    reg.remove_operator_key(&caller(K), id(P), id(0x11)).unwrap();
    assert_eq!(reg.lookup_primary(&id(0x11)), None);
    assert!(reg.operators_of(&id(P)).is_empty());
}

#[test]
fn lookups_of_unmapped_and_null_are_none() {
    let reg = onboarded();
    assert_eq!(reg.lookup_primary(&id(0x99)), None);
    assert_eq!(reg.lookup_primary(&AccountId::ZERO), None);
}

#[test]
fn scope_writes_are_idempotent() {
    let reg = onboarded();
    reg.add_address_scope(&caller(VNF), id(P), "coupon:mint").unwrap();
    reg.add_address_scope(&caller(VNF), id(P), "coupon:mint").unwrap();
    assert_eq!(reg.scopes_of(&id(P)), vec!["coupon:mint", "transactions:write"]);

    reg.remove_address_scope(&caller(VNF), id(P), "coupon:mint").unwrap();
    reg.remove_address_scope(&caller(VNF), id(P), "coupon:mint").unwrap();
    assert!(!reg.check_address_scope(&id(P), "coupon:mint"));
    assert!(reg.check_address_scope(&id(P), "transactions:write"));
}

#[test]
fn update_address_scopes_adds_then_removes() {
    let reg = onboarded();
    reg.update_address_scopes(
        &caller(VNF),
        id(P),
        Some(vec!["a".into(), "b".into()]),
        Some(vec!["b".into(), "transactions:write".into()]),
    )
    .unwrap();
    assert_eq!(reg.scopes_of(&id(P)), vec!["a"]);
    assert!(matches!(
        reg.check_operator(&id(O)),
        Err(RegistryError::PrimaryLacksRequiredScope { .. })
    ));
}

#[test]
fn scope_can_be_granted_to_the_null_identifier() {
    let reg = onboarded();
    reg.add_address_scope(&caller(VNF), AccountId::ZERO, "transactions:write").unwrap();
    assert!(reg.check_address_scope(&AccountId::ZERO, "transactions:write"));
    assert!(reg.check_operator(&AccountId::ZERO).is_err());
}

#[test]
fn permission_checks() {
    let reg = onboarded();
    reg.add_address_scope(&caller(VNF), id(P), "credential:revoke").unwrap();
    assert_eq!(reg.check_operator_permission(&id(O), "credential:revoke"), Ok(id(P)));

    let err = reg.check_operator_permission(&id(O), "coupon:burn").unwrap_err();
    assert_eq!(err.to_string(), "Permissions: primary of operator lacks requested permission");
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    for operator in [id(O), id(0x99), AccountId::ZERO] {
        let err = reg.check_operator_permission(&operator, "").unwrap_err();
        assert_eq!(err.to_string(), "Permissions: permission may not be empty");
    }
}

#[test]
fn scoped_check_reports_default_scope_text() {
    let reg = onboarded();
    let err = reg.check_operator_with_scope(&id(O), "coupon:burn").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Permissions: primary of operator lacks transactions:write scope"
    );
}

#[test]
fn mutation_log_records_commits_in_order() {
    let reg = onboarded();
    let _ = reg.add_operator_key(&caller(R1), id(P), id(0x11));
    reg.rotate_permissioning(&caller(R1), id(P), id(0x04), id(0x05)).unwrap();

    let log = reg.log();
    let sequences: Vec<u64> = log.iter().map(|r| r.sequence).collect();
    assert_eq!(sequences, vec![1, 2, 3, 4]);
    let ops: Vec<&str> = log.iter().map(|r| r.mutation.name()).collect();
    assert_eq!(
        ops,
        vec!["add_primary", "add_address_scope", "add_operator_key", "rotate_permissioning"]
    );
    assert_eq!(log[2].caller, id(K));
    assert_eq!(
        log[3].mutation,
        Mutation::RotatePermissioning {
            primary: id(P),
            new_permissioning: id(0x04),
            new_rotation: id(0x05),
        }
    );
    assert!(log.windows(2).all(|w| w[0].recorded_at <= w[1].recorded_at));
}

#[test]
fn apply_accepts_serialized_mutations() {
    let reg = Registry::initialize(&caller(VNF)).unwrap();
    let mutation: Mutation = serde_json::from_value(serde_json::json!({
        "op": "add_primary",
        "primary": id(P).to_hex(),
        "permissioning": id(K).to_hex(),
        "rotation": id(R1).to_hex(),
    }))
    .unwrap();
    let record = reg.apply(&caller(VNF), mutation).unwrap();
    assert_eq!(record.sequence, 1);
    assert_eq!(reg.get_primaries(), vec![id(P)]);
}
