// Facility-level access rules shared by the domain services

use crate::auth::{middleware::AuthenticatedUser, models::Role};
use crate::error::ApiError;

/// Admins manage everything; owners manage the facilities they own
pub fn can_manage_facility(user: &AuthenticatedUser, owner_id: i32) -> bool {
    match user.role {
        Role::Admin => true,
        Role::Owner => user.user_id == owner_id,
        Role::Staff | Role::Customer => false,
    }
}

/// Managers plus the staff assigned to the facility
pub fn can_operate_facility(user: &AuthenticatedUser, facility_id: i32, owner_id: i32) -> bool {
    match user.role {
        Role::Staff => user.facility_id == Some(facility_id),
        _ => can_manage_facility(user, owner_id),
    }
}

pub fn ensure_can_manage(user: &AuthenticatedUser, owner_id: i32) -> Result<(), ApiError> {
    if can_manage_facility(user, owner_id) {
        Ok(())
    } else {
        tracing::warn!(
            "User {} ({}) may not manage facility owned by {}",
            user.user_id,
            user.role,
            owner_id
        );
        Err(ApiError::forbidden())
    }
}

pub fn ensure_can_operate(
    user: &AuthenticatedUser,
    facility_id: i32,
    owner_id: i32,
) -> Result<(), ApiError> {
    if can_operate_facility(user, facility_id, owner_id) {
        Ok(())
    } else {
        tracing::warn!(
            "User {} ({}) may not operate facility {}",
            user.user_id,
            user.role,
            facility_id
        );
        Err(ApiError::forbidden())
    }
}

/// Which bookings and orders a caller may list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacilityScope {
    All,
    Facilities(Vec<i32>),
    Customer(i32),
}

impl FacilityScope {
    /// Narrow the scope to one requested facility
    pub fn restrict_to(self, facility_id: i32) -> FacilityScope {
        match self {
            FacilityScope::All => FacilityScope::Facilities(vec![facility_id]),
            FacilityScope::Facilities(ids) => {
                let keep = ids.contains(&facility_id);
                FacilityScope::Facilities(if keep { vec![facility_id] } else { Vec::new() })
            }
            customer => customer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, user_id: i32, facility_id: Option<i32>) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id,
            email: "u@example.com".into(),
            role,
            facility_id,
        }
    }

    #[test]
    fn test_admin_manages_any_facility() {
        assert!(can_manage_facility(&user(Role::Admin, 1, None), 99));
    }

    #[test]
    fn test_owner_manages_only_own_facility() {
        let owner = user(Role::Owner, 5, None);
        assert!(can_manage_facility(&owner, 5));
        assert!(!can_manage_facility(&owner, 6));
    }

    #[test]
    fn test_staff_operates_assigned_facility_only() {
        let staff = user(Role::Staff, 8, Some(3));
        assert!(can_operate_facility(&staff, 3, 5));
        assert!(!can_operate_facility(&staff, 4, 5));
        assert!(!can_manage_facility(&staff, 5));
    }

    #[test]
    fn test_scope_restriction() {
        assert_eq!(
            FacilityScope::All.restrict_to(4),
            FacilityScope::Facilities(vec![4])
        );
        assert_eq!(
            FacilityScope::Facilities(vec![1, 2]).restrict_to(2),
            FacilityScope::Facilities(vec![2])
        );
        assert_eq!(
            FacilityScope::Facilities(vec![1, 2]).restrict_to(3),
            FacilityScope::Facilities(vec![])
        );
        assert_eq!(FacilityScope::Customer(7).restrict_to(3), FacilityScope::Customer(7));
    }

    #[test]
    fn test_customer_never_operates() {
        let customer = user(Role::Customer, 5, None);
        assert!(!can_operate_facility(&customer, 1, 5));
        assert!(ensure_can_operate(&customer, 1, 5).is_err());
    }
}
