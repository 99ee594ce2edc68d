//! Catalog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State, rejection::FormRejection},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use shopkeep_core::ProductId;

use super::PageContext;
use crate::error::AppError;
use crate::middleware::{CurrentActor, RequireActor};
use crate::models::ProductListing;
use crate::services::catalog::{CatalogError, CatalogService, ProductInput};
use crate::state::AppState;

/// Product create/update form data.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
}

impl ProductForm {
    fn input(&self) -> ProductInput<'_> {
        ProductInput {
            name: &self.name,
            description: &self.description,
            price: &self.price,
        }
    }
}

impl From<&ProductListing> for ProductForm {
    fn from(product: &ProductListing) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
        }
    }
}

/// One listing entry, formatted for display.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: String,
    pub seller_first_name: String,
    pub listed_on: String,
    pub can_edit: bool,
}

impl ProductView {
    fn new(product: ProductListing, page: &PageContext) -> Self {
        let can_edit = page
            .actor
            .as_ref()
            .is_some_and(|actor| product.is_sold_by(actor.id));

        Self {
            id: product.id,
            listed_on: product.created_at.format("%Y-%m-%d").to_string(),
            price: product.price.to_string(),
            name: product.name,
            description: product.description,
            seller_first_name: product.seller_first_name,
            can_edit,
        }
    }
}

/// Product listing template.
#[derive(Template, WebTemplate)]
#[template(path = "product/index.html")]
pub struct IndexTemplate {
    pub page: PageContext,
    pub products: Vec<ProductView>,
}

/// New product template.
#[derive(Template, WebTemplate)]
#[template(path = "product/create.html")]
pub struct CreateTemplate {
    pub page: PageContext,
    pub error: Option<String>,
    pub form: ProductForm,
}

/// Edit product template.
#[derive(Template, WebTemplate)]
#[template(path = "product/update.html")]
pub struct UpdateTemplate {
    pub page: PageContext,
    pub error: Option<String>,
    pub id: ProductId,
    pub form: ProductForm,
}

/// Validation and name conflicts are shown on the form; anything else escapes.
fn inline_error(e: CatalogError) -> Result<String, AppError> {
    match e {
        CatalogError::Validation(_) | CatalogError::Conflict(_) => Ok(e.to_string()),
        other => Err(other.into()),
    }
}

/// List all products, newest first.
pub async fn index(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<impl IntoResponse, AppError> {
    let products = CatalogService::new(state.pool()).list_products().await?;
    let page = PageContext::new(&state, actor);
    let products = products
        .into_iter()
        .map(|product| ProductView::new(product, &page))
        .collect();

    Ok(IndexTemplate { page, products })
}

/// Display the new product form.
pub async fn create_page(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
) -> impl IntoResponse {
    CreateTemplate {
        page: PageContext::new(&state, Some(actor)),
        error: None,
        form: ProductForm::default(),
    }
}

/// Create a product sold by the current actor.
pub async fn create(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
    Form(form): Form<ProductForm>,
) -> Result<Response, AppError> {
    match CatalogService::new(state.pool())
        .create_product(form.input(), &actor)
        .await
    {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(e) => Ok(CreateTemplate {
            error: Some(inline_error(e)?),
            page: PageContext::new(&state, Some(actor)),
            form,
        }
        .into_response()),
    }
}

/// Display the edit form for an owned product.
pub async fn update_page(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse, AppError> {
    let product = CatalogService::new(state.pool())
        .get_product_for_owner(id, &actor)
        .await?;

    Ok(UpdateTemplate {
        form: ProductForm::from(product.listing()),
        page: PageContext::new(&state, Some(actor)),
        error: None,
        id,
    })
}

/// Update an owned product.
///
/// Ownership is checked before the form body is parsed.
pub async fn update(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
    Path(id): Path<ProductId>,
    form: Result<Form<ProductForm>, FormRejection>,
) -> Result<Response, AppError> {
    let catalog = CatalogService::new(state.pool());
    let product = catalog.get_product_for_owner(id, &actor).await?;
    let Form(form) = form.map_err(|e| AppError::BadRequest(e.body_text()))?;

    match catalog.update_product(&product, form.input()).await {
        Ok(()) => Ok(Redirect::to("/").into_response()),
        Err(e) => Ok(UpdateTemplate {
            error: Some(inline_error(e)?),
            page: PageContext::new(&state, Some(actor)),
            id,
            form,
        }
        .into_response()),
    }
}

/// Delete an owned product.
pub async fn delete(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
    Path(id): Path<ProductId>,
) -> Result<Redirect, AppError> {
    let catalog = CatalogService::new(state.pool());
    let product = catalog.get_product_for_owner(id, &actor).await?;
    catalog.delete_product(product).await?;

    Ok(Redirect::to("/"))
}
