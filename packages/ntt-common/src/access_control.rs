//! Role-based access control
//!
//! Roles are 16-byte identifiers. Every role has exactly one admin role,
//! `DEFAULT_ADMIN_ROLE` unless reassigned; holders of the admin role may grant
//! and revoke the role. Named roles are the first 16 bytes of keccak256 of the
//! name and are embedded as constants below.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Binary, Deps, DepsMut, Event, MessageInfo, Response, StdResult, Storage};
use cw_storage_plus::Map;

use crate::error::ContractError;
use crate::events::{LogBuilder, ROLE_ADMIN_CHANGED, ROLE_GRANTED, ROLE_REVOKED};
use crate::hash::keccak256_concat;

pub type Role = [u8; 16];

// ============================================================================
// Role Constants
// ============================================================================

/// Root of the hierarchy
pub const DEFAULT_ADMIN_ROLE: Role = [0u8; 16];

/// keccak256("UPGRADABLE_ADMIN")[..16]
pub const UPGRADABLE_ADMIN_ROLE: Role = [
    0x3b, 0x41, 0x66, 0xa9, 0xf8, 0x18, 0x16, 0x9a, 0x7d, 0x59, 0x0b, 0x1a, 0xa6, 0xe0, 0xd0, 0x7b,
];

/// keccak256("MINTER")[..16]
pub const MINTER_ROLE: Role = [
    0xf0, 0x88, 0x7b, 0xa6, 0x5e, 0xe2, 0x02, 0x4e, 0xa8, 0x81, 0xd9, 0x1b, 0x74, 0xc2, 0x45, 0x0e,
];

/// keccak256("NTT_MANAGER_ADMIN")[..16]
pub const NTT_MANAGER_ADMIN_ROLE: Role = [
    0x6a, 0x67, 0x38, 0x05, 0xba, 0xa5, 0xdd, 0x95, 0x92, 0xea, 0xc3, 0x8e, 0xc3, 0x99, 0xb8, 0x28,
];

/// keccak256("PAUSER")[..16]
pub const PAUSER_ROLE: Role = [
    0x53, 0x94, 0x40, 0x82, 0x00, 0x30, 0xc4, 0x99, 0x4d, 0xb4, 0xe3, 0x1b, 0x6b, 0x80, 0x0d, 0xea,
];

/// keccak256("UNPAUSER")[..16]
pub const UNPAUSER_ROLE: Role = [
    0x82, 0xb3, 0x2d, 0x9a, 0xb5, 0x10, 0x0d, 0xb0, 0x8a, 0xeb, 0x9a, 0x0e, 0x08, 0xb4, 0x22, 0xd1,
];

/// keccak256("RATE_LIMITER_MANAGER")[..16]
pub const RATE_LIMITER_MANAGER_ROLE: Role = [
    0xba, 0xfc, 0x6c, 0xe9, 0x2d, 0x46, 0x43, 0x3f, 0xc5, 0xb8, 0x2a, 0x97, 0x37, 0x19, 0xe9, 0x86,
];

/// keccak256("MANAGER")[..16]
pub const MANAGER_ROLE: Role = [
    0xaf, 0x29, 0x0d, 0x86, 0x80, 0x82, 0x0a, 0xad, 0x92, 0x28, 0x55, 0xf3, 0x9b, 0x30, 0x60, 0x97,
];

/// keccak256("RELAYER")[..16]
pub const RELAYER_ROLE: Role = [
    0xab, 0x4f, 0x86, 0x4e, 0x52, 0x01, 0xb0, 0xfd, 0xe9, 0xb5, 0xee, 0x3e, 0x4c, 0xf9, 0x63, 0x84,
];

/// Derive a role id from arbitrary name parts
pub fn role_id(parts: &[&[u8]]) -> Role {
    let hash = keccak256_concat(parts);
    let mut role = [0u8; 16];
    role.copy_from_slice(&hash[..16]);
    role
}

/// Admin role for a message handler registered with a transceiver manager
pub fn message_handler_admin_role(handler: &Addr) -> Role {
    role_id(&[b"MESSAGE_HANDLER_ADMIN_", handler.as_str().as_bytes()])
}

/// Parse a role id from message input
pub fn parse_role(value: &Binary) -> Result<Role, ContractError> {
    value.as_slice().try_into().map_err(|_| ContractError::InvalidAddress {
        reason: format!("role must be 16 bytes, got {}", value.len()),
    })
}

// ============================================================================
// Storage
// ============================================================================

/// (role, account) → held
const ROLES: Map<(&[u8], &Addr), bool> = Map::new("ac_roles");

/// role → admin role, absent means DEFAULT_ADMIN_ROLE
const ROLE_ADMINS: Map<&[u8], Role> = Map::new("ac_role_admins");

// ============================================================================
// Messages
// ============================================================================

/// Role ids exposed by every contract's `RoleIds` query
#[cw_serde]
pub struct RoleIdsResponse {
    pub default_admin: Binary,
    pub upgradable_admin: Binary,
    pub minter: Binary,
    pub ntt_manager_admin: Binary,
    pub pauser: Binary,
    pub unpauser: Binary,
    pub rate_limiter_manager: Binary,
    pub manager: Binary,
    pub relayer: Binary,
}

impl RoleIdsResponse {
    pub fn all() -> Self {
        let b = |r: Role| Binary::from(r.to_vec());
        Self {
            default_admin: b(DEFAULT_ADMIN_ROLE),
            upgradable_admin: b(UPGRADABLE_ADMIN_ROLE),
            minter: b(MINTER_ROLE),
            ntt_manager_admin: b(NTT_MANAGER_ADMIN_ROLE),
            pauser: b(PAUSER_ROLE),
            unpauser: b(UNPAUSER_ROLE),
            rate_limiter_manager: b(RATE_LIMITER_MANAGER_ROLE),
            manager: b(MANAGER_ROLE),
            relayer: b(RELAYER_ROLE),
        }
    }
}

#[cw_serde]
pub struct HasRoleResponse {
    pub has_role: bool,
}

#[cw_serde]
pub struct RoleAdminResponse {
    pub admin_role: Binary,
}

// ============================================================================
// Reads
// ============================================================================

pub fn has_role(storage: &dyn Storage, role: &Role, account: &Addr) -> StdResult<bool> {
    Ok(ROLES
        .may_load(storage, (role.as_slice(), account))?
        .unwrap_or(false))
}

pub fn get_role_admin(storage: &dyn Storage, role: &Role) -> StdResult<Role> {
    Ok(ROLE_ADMINS
        .may_load(storage, role.as_slice())?
        .unwrap_or(DEFAULT_ADMIN_ROLE))
}

/// Fail with `Unauthorized` unless `account` holds `role`
pub fn check_role(storage: &dyn Storage, role: &Role, account: &Addr) -> Result<(), ContractError> {
    if !has_role(storage, role, account)? {
        return Err(ContractError::Unauthorized {
            role: hex::encode(role),
            account: account.to_string(),
        });
    }
    Ok(())
}

// ============================================================================
// Unchecked Writes
// ============================================================================

/// Grant without an authorization check. Returns an event only when the
/// grant is new.
pub fn grant_role(
    storage: &mut dyn Storage,
    role: &Role,
    account: &Addr,
    sender: &Addr,
) -> Result<Option<Event>, ContractError> {
    if has_role(storage, role, account)? {
        return Ok(None);
    }
    ROLES.save(storage, (role.as_slice(), account), &true)?;
    let event = LogBuilder::new(&ROLE_GRANTED)
        .byte16(role)
        .string(account.as_str())
        .string(sender.as_str())
        .build()?;
    Ok(Some(event))
}

/// Revoke without an authorization check. Returns an event only when the
/// account held the role.
pub fn revoke_role(
    storage: &mut dyn Storage,
    role: &Role,
    account: &Addr,
    sender: &Addr,
) -> Result<Option<Event>, ContractError> {
    if !has_role(storage, role, account)? {
        return Ok(None);
    }
    ROLES.remove(storage, (role.as_slice(), account));
    let event = LogBuilder::new(&ROLE_REVOKED)
        .byte16(role)
        .string(account.as_str())
        .string(sender.as_str())
        .build()?;
    Ok(Some(event))
}

pub fn set_role_admin(
    storage: &mut dyn Storage,
    role: &Role,
    admin_role: &Role,
) -> Result<Event, ContractError> {
    let previous = get_role_admin(storage, role)?;
    ROLE_ADMINS.save(storage, role.as_slice(), admin_role)?;
    LogBuilder::new(&ROLE_ADMIN_CHANGED)
        .byte16(role)
        .byte16(&previous)
        .byte16(admin_role)
        .build()
}

// ============================================================================
// Execute Handlers
// ============================================================================

/// Grant a role (caller must hold the role's admin role)
pub fn execute_grant_role(
    deps: DepsMut,
    info: MessageInfo,
    role: Binary,
    account: String,
) -> Result<Response, ContractError> {
    let role = parse_role(&role)?;
    let account = deps.api.addr_validate(&account)?;
    let admin = get_role_admin(deps.storage, &role)?;
    check_role(deps.storage, &admin, &info.sender)?;

    let event = grant_role(deps.storage, &role, &account, &info.sender)?;
    Ok(Response::new()
        .add_events(event)
        .add_attribute("method", "grant_role")
        .add_attribute("role", hex::encode(role))
        .add_attribute("account", account))
}

/// Revoke a role (caller must hold the role's admin role)
pub fn execute_revoke_role(
    deps: DepsMut,
    info: MessageInfo,
    role: Binary,
    account: String,
) -> Result<Response, ContractError> {
    let role = parse_role(&role)?;
    let account = deps.api.addr_validate(&account)?;
    let admin = get_role_admin(deps.storage, &role)?;
    check_role(deps.storage, &admin, &info.sender)?;

    let event = revoke_role(deps.storage, &role, &account, &info.sender)?;
    Ok(Response::new()
        .add_events(event)
        .add_attribute("method", "revoke_role")
        .add_attribute("role", hex::encode(role))
        .add_attribute("account", account))
}

/// Drop a role held by the caller
pub fn execute_renounce_role(
    deps: DepsMut,
    info: MessageInfo,
    role: Binary,
) -> Result<Response, ContractError> {
    let role = parse_role(&role)?;
    let event = revoke_role(deps.storage, &role, &info.sender, &info.sender)?;
    Ok(Response::new()
        .add_events(event)
        .add_attribute("method", "renounce_role")
        .add_attribute("role", hex::encode(role)))
}

/// Reassign a role's admin (DEFAULT_ADMIN_ROLE only)
pub fn execute_set_role_admin(
    deps: DepsMut,
    info: MessageInfo,
    role: Binary,
    admin_role: Binary,
) -> Result<Response, ContractError> {
    let role = parse_role(&role)?;
    let admin_role = parse_role(&admin_role)?;
    check_role(deps.storage, &DEFAULT_ADMIN_ROLE, &info.sender)?;

    let event = set_role_admin(deps.storage, &role, &admin_role)?;
    Ok(Response::new()
        .add_event(event)
        .add_attribute("method", "set_role_admin")
        .add_attribute("role", hex::encode(role))
        .add_attribute("admin_role", hex::encode(admin_role)))
}

// ============================================================================
// Queries
// ============================================================================

pub fn query_has_role(deps: Deps, role: Binary, account: String) -> StdResult<HasRoleResponse> {
    let role: Role = role
        .as_slice()
        .try_into()
        .map_err(|_| cosmwasm_std::StdError::generic_err("role must be 16 bytes"))?;
    let account = deps.api.addr_validate(&account)?;
    Ok(HasRoleResponse {
        has_role: has_role(deps.storage, &role, &account)?,
    })
}

pub fn query_role_admin(deps: Deps, role: Binary) -> StdResult<RoleAdminResponse> {
    let role: Role = role
        .as_slice()
        .try_into()
        .map_err(|_| cosmwasm_std::StdError::generic_err("role must be 16 bytes"))?;
    Ok(RoleAdminResponse {
        admin_role: Binary::from(get_role_admin(deps.storage, &role)?.to_vec()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::keccak256;
    use cosmwasm_std::testing::{mock_dependencies, mock_info};

    fn bin(role: Role) -> Binary {
        Binary::from(role.to_vec())
    }

    #[test]
    fn test_embedded_role_ids_match_keccak() {
        let named: [(&str, Role); 8] = [
            ("UPGRADABLE_ADMIN", UPGRADABLE_ADMIN_ROLE),
            ("MINTER", MINTER_ROLE),
            ("NTT_MANAGER_ADMIN", NTT_MANAGER_ADMIN_ROLE),
            ("PAUSER", PAUSER_ROLE),
            ("UNPAUSER", UNPAUSER_ROLE),
            ("RATE_LIMITER_MANAGER", RATE_LIMITER_MANAGER_ROLE),
            ("MANAGER", MANAGER_ROLE),
            ("RELAYER", RELAYER_ROLE),
        ];
        for (name, role) in named {
            assert_eq!(&keccak256(name.as_bytes())[..16], &role, "{name}");
            assert_eq!(role_id(&[name.as_bytes()]), role);
        }
    }

    #[test]
    fn test_minter_grant_requires_admin() {
        let mut deps = mock_dependencies();
        let admin = Addr::unchecked("admin");
        grant_role(deps.as_mut().storage, &DEFAULT_ADMIN_ROLE, &admin, &admin).unwrap();

        let err = execute_grant_role(
            deps.as_mut(),
            mock_info("stranger", &[]),
            bin(MINTER_ROLE),
            "minter".to_string(),
        )
        .unwrap_err();
        assert!(matches!(err, ContractError::Unauthorized { .. }));

        let res = execute_grant_role(
            deps.as_mut(),
            mock_info("admin", &[]),
            bin(MINTER_ROLE),
            "minter".to_string(),
        )
        .unwrap();
        assert_eq!(res.events.len(), 1);
        assert_eq!(res.events[0].ty, "RoleGranted");
        assert!(has_role(&deps.storage, &MINTER_ROLE, &Addr::unchecked("minter")).unwrap());

        // second grant is a successful no-op
        let res = execute_grant_role(
            deps.as_mut(),
            mock_info("admin", &[]),
            bin(MINTER_ROLE),
            "minter".to_string(),
        )
        .unwrap();
        assert!(res.events.is_empty());
    }

    #[test]
    fn test_revoke_unheld_role_is_noop() {
        let mut deps = mock_dependencies();
        let admin = Addr::unchecked("admin");
        grant_role(deps.as_mut().storage, &DEFAULT_ADMIN_ROLE, &admin, &admin).unwrap();

        let res = execute_revoke_role(
            deps.as_mut(),
            mock_info("admin", &[]),
            bin(PAUSER_ROLE),
            "nobody".to_string(),
        )
        .unwrap();
        assert!(res.events.is_empty());
    }

    #[test]
    fn test_self_administered_role() {
        let mut deps = mock_dependencies();
        let admin = Addr::unchecked("admin");
        let handler_admin = Addr::unchecked("handler_admin");
        let role = message_handler_admin_role(&Addr::unchecked("handler"));
        grant_role(deps.as_mut().storage, &DEFAULT_ADMIN_ROLE, &admin, &admin).unwrap();
        set_role_admin(deps.as_mut().storage, &role, &role).unwrap();
        grant_role(deps.as_mut().storage, &role, &handler_admin, &admin).unwrap();

        // default admin no longer administers the role
        let err = execute_grant_role(
            deps.as_mut(),
            mock_info("admin", &[]),
            bin(role),
            "other".to_string(),
        )
        .unwrap_err();
        assert!(matches!(err, ContractError::Unauthorized { .. }));

        execute_grant_role(
            deps.as_mut(),
            mock_info("handler_admin", &[]),
            bin(role),
            "other".to_string(),
        )
        .unwrap();
        assert_eq!(get_role_admin(&deps.storage, &role).unwrap(), role);
    }

    #[test]
    fn test_set_role_admin_requires_default_admin() {
        let mut deps = mock_dependencies();
        let err = execute_set_role_admin(
            deps.as_mut(),
            mock_info("stranger", &[]),
            bin(MINTER_ROLE),
            bin(PAUSER_ROLE),
        )
        .unwrap_err();
        assert!(matches!(err, ContractError::Unauthorized { .. }));
    }

    #[test]
    fn test_renounce_and_bad_role_length() {
        let mut deps = mock_dependencies();
        let holder = Addr::unchecked("holder");
        grant_role(deps.as_mut().storage, &PAUSER_ROLE, &holder, &holder).unwrap();
        execute_renounce_role(deps.as_mut(), mock_info("holder", &[]), bin(PAUSER_ROLE)).unwrap();
        assert!(!has_role(&deps.storage, &PAUSER_ROLE, &holder).unwrap());

        let err = parse_role(&Binary::from(vec![1u8; 15])).unwrap_err();
        assert!(matches!(err, ContractError::InvalidAddress { .. }));
    }
}
