use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{CategoryResponseDto, CreateCategoryDto};
use crate::features::categories::models::ServiceCategory;
use crate::features::categories::repositories::CategoryRepository;
use crate::shared::validation::{blank_to_none, collapse_whitespace, slugify, SLUG_REGEX};

/// Service for category operations
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    /// List all categories ordered by name
    pub async fn list(&self) -> Result<Vec<CategoryResponseDto>> {
        let categories = self.categories.list().await?;
        Ok(categories.into_iter().map(Into::into).collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<CategoryResponseDto> {
        self.find(id).await.map(Into::into)
    }

    /// Resolve a category id supplied in a job or profile payload.
    ///
    /// An unknown id is a validation failure of the payload rather than a missing resource.
    pub async fn require(&self, id: Uuid) -> Result<ServiceCategory> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Validation(format!("Category '{}' does not exist", id)))
    }

    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryResponseDto> {
        let dto = CreateCategoryDto {
            name: collapse_whitespace(&dto.name),
            description: blank_to_none(dto.description),
        };
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let slug = slugify(&dto.name);
        if !SLUG_REGEX.is_match(&slug) {
            return Err(AppError::Validation(
                "Name must contain at least one letter or digit".to_string(),
            ));
        }

        let category = self
            .categories
            .insert(&dto.name, &slug, dto.description.as_deref())
            .await?;

        tracing::info!("Category created: {} ({})", category.name, category.id);
        Ok(category.into())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.categories.delete(id).await? {
            return Err(AppError::NotFound(format!("Category '{}' not found", id)));
        }
        tracing::info!("Category deleted: {}", id);
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<ServiceCategory> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::InMemoryStore;
    use tokio_test::{assert_err, assert_ok};

    fn service(store: &Arc<InMemoryStore>) -> CategoryService {
        CategoryService::new(store.clone())
    }

    #[tokio::test]
    async fn test_create_category_derives_slug() {
        let store = InMemoryStore::new();
        let created = assert_ok!(
            service(&store)
                .create(CreateCategoryDto {
                    name: "  Pest   Control ".to_string(),
                    description: Some("   ".to_string()),
                })
                .await
        );

        assert_eq!(created.name, "Pest Control");
        assert_eq!(created.slug, "pest-control");
        assert_eq!(created.description, None);
    }

    #[tokio::test]
    async fn test_duplicate_category_name_conflicts() {
        let store = InMemoryStore::new();
        let err = service(&store)
            .create(CreateCategoryDto {
                name: "plumbing".to_string(),
                description: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_short_name_is_rejected() {
        let store = InMemoryStore::new();
        let result = service(&store)
            .create(CreateCategoryDto {
                name: " X ".to_string(),
                description: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_unknown_category_is_not_found() {
        let store = InMemoryStore::new();
        let result = service(&store).delete(Uuid::new_v4()).await;
        assert_err!(&result);
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_require_unknown_category_is_validation_error() {
        let store = InMemoryStore::new();
        let service = service(&store);
        assert_ok!(service.require(store.category_id("Plumbing")).await);
        assert!(matches!(
            service.require(Uuid::new_v4()).await,
            Err(AppError::Validation(_))
        ));
    }
}
