//! Cart route handlers.
//!
//! The cart lives in the session under `cart:v1`, in the same JSON layout a
//! browser client keeps in local storage. Cart operations use HTMX for
//! in-place updates; plain form posts redirect back instead.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use shopfront_core::{Cart, CartItem, ProductId};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{Layout, set_flash};
use crate::models::{Flash, session_keys};
use crate::routes::is_htmx;
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub id: i64,
    pub name: String,
    pub qty: u32,
    pub price: String,
    pub line_total: String,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.as_i64(),
            name: item
                .name
                .clone()
                .unwrap_or_else(|| format!("Product #{}", item.id)),
            qty: item.qty,
            price: item.price.map(|p| p.to_string()).unwrap_or_default(),
            line_total: item.line_total().map(|p| p.to_string()).unwrap_or_default(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            lines: cart.items().iter().map(CartLineView::from).collect(),
            subtotal: cart.subtotal().to_string(),
            item_count: cart.total_quantity(),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the cart from the session. A missing or corrupt cart is empty.
pub async fn load_cart(session: &Session) -> Cart {
    session
        .get::<String>(session_keys::CART)
        .await
        .ok()
        .flatten()
        .map(|raw| Cart::from_json(&raw))
        .unwrap_or_default()
}

/// Persist the cart to the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_cart(
    session: &Session,
    cart: &Cart,
) -> std::result::Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart.to_json()).await
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Respond to a cart mutation: the items fragment for HTMX, else back to `/cart`.
fn cart_changed(headers: &HeaderMap, cart: &Cart) -> Response {
    if is_htmx(headers) {
        (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartItemsTemplate {
                cart: CartView::from(cart),
            },
        )
            .into_response()
    } else {
        Redirect::to("/cart").into_response()
    }
}

/// Display cart page.
#[instrument(skip(session, layout))]
pub async fn show(session: Session, layout: Layout) -> impl IntoResponse {
    let cart = load_cart(&session).await;
    CartShowTemplate {
        layout,
        cart: CartView::from(&cart),
    }
}

/// Add a product to the cart.
///
/// Name and price are copied from the catalog (or the sample catalog when
/// the API is down). HTMX requests get the new count badge; plain posts are
/// redirected back to the product with a flash notice.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let (product, _) = state
        .catalog()
        .product(form.product_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.product_id)))?;

    let mut cart = load_cart(&session).await;
    let requested = form.quantity.unwrap_or(1).max(1);
    let in_cart = cart
        .items()
        .iter()
        .find(|item| item.id == product.id)
        .map_or(0, |item| item.qty);
    cart.add_qty(&product, requested);
    save_cart(&session, &cart).await?;

    let product_id = product.id.to_string();
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product_id.as_str())]));

    if is_htmx(&headers) {
        return Ok((
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartCountTemplate {
                count: cart.total_quantity(),
            },
        )
            .into_response());
    }

    let flash = if in_cart.saturating_add(requested) > Cart::MAX_QTY {
        Flash::error(format!(
            "At most {} of {} per order",
            Cart::MAX_QTY,
            product.name
        ))
    } else {
        Flash::success(format!("Added {} to cart", product.name))
    };
    set_flash(&session, flash).await;
    Ok(Redirect::to(&format!("/products/{}", product.id)).into_response())
}

/// Set a line's quantity. Zero removes the line.
#[instrument(skip(session, headers))]
pub async fn update(
    session: Session,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await;
    cart.set_qty(form.product_id, form.quantity);
    save_cart(&session, &cart).await?;
    Ok(cart_changed(&headers, &cart))
}

/// Remove a line.
#[instrument(skip(session, headers))]
pub async fn remove(
    session: Session,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await;
    cart.remove(form.product_id);
    save_cart(&session, &cart).await?;
    Ok(cart_changed(&headers, &cart))
}

/// Empty the cart.
#[instrument(skip(session, headers))]
pub async fn clear(session: Session, headers: HeaderMap) -> Result<Response> {
    let mut cart = load_cart(&session).await;
    cart.clear();
    save_cart(&session, &cart).await?;
    Ok(cart_changed(&headers, &cart))
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    CartCountTemplate {
        count: load_cart(&session).await.total_quantity(),
    }
}
