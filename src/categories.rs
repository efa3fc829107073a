// Field categories (football, badminton, ...); managed by admins

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::ApiError;
use crate::response::{ApiResponse, Created};
use crate::validation::validate_not_blank;
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategory {
    #[validate(
        length(max = 50, message = "Tên loại sân không được vượt quá 50 ký tự"),
        custom = "validate_not_blank"
    )]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>("SELECT id, name, description FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn exists(&self, id: i32) -> Result<bool, sqlx::Error> {
        crate::db::exists_by_id(&self.pool, "categories", id).await
    }

    pub async fn name_taken(&self, name: &str) -> Result<bool, sqlx::Error> {
        let taken: Option<bool> = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE LOWER(name) = LOWER($1))",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken.unwrap_or(false))
    }

    pub async fn create(&self, name: &str, description: Option<&str>) -> Result<Category, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, description) VALUES ($1, $2) RETURNING id, name, description",
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn in_use(&self, id: i32) -> Result<bool, sqlx::Error> {
        let used: Option<bool> =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM fields WHERE category_id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(used.unwrap_or(false))
    }

    pub async fn delete(&self, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Handler for GET /api/categories
#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, description = "All categories", body = Vec<Category>)),
    tag = "categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Category>>, ApiError> {
    let categories = state.categories.list().await?;
    Ok(ApiResponse::list("Lấy danh sách loại sân thành công", categories))
}

/// Handler for POST /api/categories (admin route layer)
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Invalid input data"),
        (status = 409, description = "Name already used")
    ),
    security(("bearer" = [])),
    tag = "categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategory>,
) -> Result<Created<Category>, ApiError> {
    payload.validate()?;
    let name = payload.name.trim();

    if state.categories.name_taken(name).await? {
        tracing::warn!("Attempt to create duplicate category: {}", name);
        return Err(ApiError::conflict(format!("Loại sân '{}' đã tồn tại", name)));
    }

    let category = state
        .categories
        .create(name, payload.description.as_deref())
        .await?;

    tracing::info!("Created category {}", category.id);
    Ok(Created::new(
        format!("/api/categories/{}", category.id),
        "Tạo loại sân thành công",
        category,
    ))
}

/// Handler for DELETE /api/categories/:id (admin route layer)
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Category still used by fields")
    ),
    security(("bearer" = [])),
    tag = "categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<ApiResponse<()>, ApiError> {
    if !state.categories.exists(id).await? {
        return Err(ApiError::not_found("loại sân", id));
    }
    if state.categories.in_use(id).await? {
        return Err(ApiError::conflict("Loại sân đang được sử dụng bởi sân khác"));
    }
    state.categories.delete(id).await?;

    tracing::info!("Deleted category {}", id);
    Ok(ApiResponse::empty("Xóa loại sân thành công"))
}
