//! Checkout route handlers.

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
use crate::middleware::RequireActor;
use crate::models::ProductListing;
use crate::services::catalog::CatalogService;
use crate::services::checkout::{AddressInput, CheckoutError, CheckoutService};
use crate::state::AppState;

/// Shipping address form data.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PurchaseForm {
    #[serde(default)]
    pub street_1: String,
    #[serde(default)]
    pub street_2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
}

impl PurchaseForm {
    fn input(&self) -> AddressInput<'_> {
        AddressInput {
            street_1: &self.street_1,
            street_2: &self.street_2,
            city: &self.city,
            state: &self.state,
            zip: &self.zip,
        }
    }
}

/// Checkout form template.
#[derive(Template, WebTemplate)]
#[template(path = "purchase/create.html")]
pub struct PurchaseTemplate {
    pub page: PageContext,
    pub error: Option<String>,
    pub product: ProductListing,
    pub form: PurchaseForm,
}

/// Display the checkout form for a product.
pub async fn purchase_page(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse, AppError> {
    let product = CatalogService::new(state.pool())
        .get_product_for_view(id)
        .await?;

    Ok(PurchaseTemplate {
        page: PageContext::new(&state, Some(actor)),
        error: None,
        product,
        form: PurchaseForm::default(),
    })
}

/// Record a purchase by the current actor.
pub async fn purchase(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
    Path(id): Path<ProductId>,
    form: Result<Form<PurchaseForm>, FormRejection>,
) -> Result<Response, AppError> {
    let catalog = CatalogService::new(state.pool());
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => {
            catalog.get_product_for_view(id).await?;
            return Err(AppError::BadRequest(rejection.body_text()));
        }
    };

    match CheckoutService::new(state.pool())
        .create_purchase(id, form.input(), &actor)
        .await
    {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(CheckoutError::Validation(e)) => {
            let product = catalog.get_product_for_view(id).await?;
            Ok(PurchaseTemplate {
                page: PageContext::new(&state, Some(actor)),
                error: Some(e.to_string()),
                product,
                form,
            }
            .into_response())
        }
        Err(e) => Err(e.into()),
    }
}
