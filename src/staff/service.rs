use sqlx::PgPool;
use validator::Validate;

use crate::auth::{
    models::Role,
    password::PasswordService,
    repository::{NewUser, TokenRepository, UserRepository},
    AuthenticatedUser,
};
use crate::error::ApiError;
use crate::facilities::FacilityService;
use crate::query::{QueryParams, QueryValidator};
use crate::staff::{
    models::{CreateStaff, CreatedStaff, StaffMember, UpdateStaff},
    repository::StaffRepository,
};

const SORTABLE: &[(&str, &str)] = &[
    ("full_name", "u.full_name"),
    ("position", "s.position"),
    ("hired_at", "s.hired_at"),
];

const INITIAL_PASSWORD_LEN: usize = 12;

/// Staff accounts of a facility, managed by its owner or an admin
#[derive(Clone)]
pub struct StaffService {
    pool: PgPool,
    repo: StaffRepository,
    users: UserRepository,
    tokens: TokenRepository,
    facilities: FacilityService,
}

impl StaffService {
    pub fn new(pool: PgPool, facilities: FacilityService) -> Self {
        Self {
            repo: StaffRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            tokens: TokenRepository::new(pool.clone()),
            pool,
            facilities,
        }
    }

    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        facility_id: i32,
        params: QueryParams,
    ) -> Result<(Vec<StaffMember>, i64), ApiError> {
        let validated = QueryValidator::validate(params, SORTABLE)?;
        self.facilities.get_managed(user, facility_id).await?;
        Ok(self.repo.list_by_facility(facility_id, &validated).await?)
    }

    async fn find_managed(&self, user: &AuthenticatedUser, id: i32) -> Result<StaffMember, ApiError> {
        let member = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("nhân viên", id))?;
        self.facilities.get_managed(user, member.facility_id).await?;
        Ok(member)
    }

    /// Create the login account and the staff assignment together
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        facility_id: i32,
        request: CreateStaff,
    ) -> Result<CreatedStaff, ApiError> {
        request.validate()?;
        self.facilities.get_managed(user, facility_id).await?;

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(ApiError::conflict(format!(
                "Email '{}' đã được sử dụng",
                request.email.trim()
            )));
        }

        let (password, initial_password) = match request.password {
            Some(password) => (password, None),
            None => {
                let generated = PasswordService::generate_initial_password(INITIAL_PASSWORD_LEN);
                (generated.clone(), Some(generated))
            }
        };
        let password_hash = PasswordService::hash_password(&password)?;

        let mut tx = self.pool.begin().await?;
        let account = UserRepository::create_user_in_tx(
            &mut tx,
            NewUser {
                email: &request.email,
                password_hash: &password_hash,
                full_name: &request.full_name,
                phone: request.phone.as_deref(),
                role: Role::Staff,
            },
        )
        .await?;
        let id = StaffRepository::insert(&mut tx, account.id, facility_id, request.position.trim()).await?;
        tx.commit().await?;

        let staff = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("nhân viên", id))?;

        tracing::info!(
            "Staff {} (user {}) added to facility {} by user {}",
            staff.id,
            account.id,
            facility_id,
            user.user_id
        );
        Ok(CreatedStaff {
            staff,
            initial_password,
        })
    }

    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: i32,
        request: UpdateStaff,
    ) -> Result<StaffMember, ApiError> {
        request.validate()?;
        let existing = self.find_managed(user, id).await?;

        let position = request
            .position
            .as_deref()
            .map(str::trim)
            .unwrap_or(&existing.position);
        let full_name = request
            .full_name
            .as_deref()
            .map(str::trim)
            .unwrap_or(&existing.full_name);
        let phone = request.phone.as_deref().or(existing.phone.as_deref());
        let is_active = request.is_active.unwrap_or(existing.is_active);

        let mut tx = self.pool.begin().await?;
        StaffRepository::update_position(&mut tx, id, position).await?;
        StaffRepository::update_user(&mut tx, existing.user_id, full_name, phone, is_active).await?;
        tx.commit().await?;

        if existing.is_active && !is_active {
            self.tokens.invalidate_all_for_user(existing.user_id).await?;
        }

        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("nhân viên", id))
    }

    /// Remove a staff member; the account is disabled and its sessions revoked
    pub async fn delete(&self, user: &AuthenticatedUser, id: i32) -> Result<(), ApiError> {
        let existing = self.find_managed(user, id).await?;

        let mut tx = self.pool.begin().await?;
        StaffRepository::remove(&mut tx, id, existing.user_id).await?;
        tx.commit().await?;

        let revoked = self.tokens.invalidate_all_for_user(existing.user_id).await?;
        tracing::info!(
            "Staff {} removed from facility {}, {} session(s) revoked",
            id,
            existing.facility_id,
            revoked
        );
        Ok(())
    }
}
