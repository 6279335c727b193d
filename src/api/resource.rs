use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use serde::de::Error as _;
use serde_json::Value;

use super::client::{ApiClient, Target, from_normalized};
use crate::errors::ApiError;
use crate::form::category::CategoryPayload;
use crate::form::product::ProductPayload;
use crate::form::user::UserPayload;
use crate::models::{Category, Order, OrderStatus, Product, Record, User};

/// An entity family served under one REST path.
pub trait Resource: Send + Sync + 'static {
    /// Collection path under the API base, e.g. `/products`.
    const PATH: &'static str;
    /// Display name used in errors.
    const NAME: &'static str;
    /// Envelope key of the list response, e.g. `products`.
    const LIST_KEY: &'static str;

    type Record: Record;
    type Payload: Serialize + Send + Sync;
}

pub struct Products;
pub struct Categories;
pub struct Orders;
pub struct Users;

impl Resource for Products {
    const PATH: &'static str = "/products";
    const NAME: &'static str = "Product";
    const LIST_KEY: &'static str = "products";
    type Record = Product;
    type Payload = ProductPayload;
}

impl Resource for Categories {
    const PATH: &'static str = "/categories";
    const NAME: &'static str = "Category";
    const LIST_KEY: &'static str = "categories";
    type Record = Category;
    type Payload = CategoryPayload;
}

impl Resource for Orders {
    const PATH: &'static str = "/orders";
    const NAME: &'static str = "Order";
    const LIST_KEY: &'static str = "orders";
    type Record = Order;
    // Orders are placed by the storefront, never created here.
    type Payload = Value;
}

impl Resource for Users {
    const PATH: &'static str = "/users";
    const NAME: &'static str = "User";
    const LIST_KEY: &'static str = "users";
    type Record = User;
    type Payload = UserPayload;
}

/// Page request. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    /// Extra server-side filters, forwarded as query parameters.
    pub params: Vec<(String, String)>,
}

impl ListQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            params: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Vec<(String, String)>) -> Self {
        self.params = params;
        self
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.page == 0 {
            return Err(ApiError::BadRequest("page must be at least 1".to_string()));
        }
        if self.limit == 0 {
            return Err(ApiError::BadRequest("limit must be positive".to_string()));
        }
        Ok(())
    }

    fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        pairs.extend(self.params.iter().cloned());
        pairs
    }
}

/// One page of a collection plus the server's total count.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

/// Anything that can serve pages of `T`. Implemented by the HTTP clients and
/// by in-memory fakes in tests.
#[async_trait]
pub trait CollectionSource<T>: Send + Sync {
    async fn fetch_page(&self, query: &ListQuery) -> Result<Page<T>, ApiError>;
}

/// Anything that can delete one record by id.
#[async_trait]
pub trait RemoveSource: Send + Sync {
    async fn remove_one(&self, id: &str) -> Result<(), ApiError>;
}

/// Decode a list response.
///
/// Accepts `{ <key>: [...], total }`, `{ items|data: [...], total }`, or a
/// bare array. A missing total falls back to the number of items.
pub(crate) fn decode_page<T: Record>(
    value: Value,
    key: &str,
    query: &ListQuery,
) -> Result<Page<T>, ApiError> {
    let (items, total) = match value {
        Value::Array(items) => {
            let total = items.len() as u64;
            (Value::Array(items), total)
        }
        Value::Object(mut map) => {
            let items = [key, "items", "data"]
                .iter()
                .find_map(|k| map.remove(*k))
                .ok_or_else(|| ApiError::Parse {
                    context: key.to_string(),
                    source: serde_json::Error::custom(format!(
                        "list response has no '{}' array",
                        key
                    )),
                })?;
            let counted = items.as_array().map_or(0, |a| a.len() as u64);
            let total = map.get("total").and_then(Value::as_u64).unwrap_or(counted);
            (items, total)
        }
        _ => {
            return Err(ApiError::Parse {
                context: key.to_string(),
                source: serde_json::Error::custom("list response is neither an array nor an object"),
            });
        }
    };
    let items: Vec<T> = from_normalized(items, key)?;
    Ok(Page {
        items,
        total,
        page: query.page,
        limit: query.limit,
    })
}

/// Typed CRUD client for one [`Resource`].
pub struct ResourceClient<R: Resource> {
    api: ApiClient,
    _resource: PhantomData<R>,
}

impl<R: Resource> Clone for ResourceClient<R> {
    fn clone(&self) -> Self {
        Self::new(self.api.clone())
    }
}

impl<R: Resource> ResourceClient<R> {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            _resource: PhantomData,
        }
    }

    fn item_url(&self, id: &str) -> String {
        self.api.url(&format!("{}/{}", R::PATH, id))
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Page<R::Record>, ApiError> {
        query.validate()?;
        tracing::debug!(resource = R::NAME, page = query.page, limit = query.limit, "Listing");
        let request = self
            .api
            .authorized(Method::GET, &self.api.url(R::PATH))?
            .query(&query.pairs());
        let response = self.api.dispatch(request, Target::collection(R::NAME)).await?;
        let value = ApiClient::decode_value(response, R::LIST_KEY).await?;
        decode_page(value, R::LIST_KEY, query)
    }

    pub async fn get(&self, id: &str) -> Result<R::Record, ApiError> {
        let request = self.api.authorized(Method::GET, &self.item_url(id))?;
        let response = self.api.dispatch(request, Target::item(R::NAME, id)).await?;
        ApiClient::decode(response, R::NAME).await
    }

    pub async fn create(&self, payload: &R::Payload) -> Result<R::Record, ApiError> {
        tracing::debug!(resource = R::NAME, "Creating");
        let request = self
            .api
            .authorized(Method::POST, &self.api.url(R::PATH))?
            .json(payload);
        let response = self.api.dispatch(request, Target::collection(R::NAME)).await?;
        ApiClient::decode(response, R::NAME).await
    }

    /// PATCH with whatever fields `patch` serializes; unset fields are left alone.
    pub async fn update<P>(&self, id: &str, patch: &P) -> Result<R::Record, ApiError>
    where
        P: Serialize + Sync + ?Sized,
    {
        tracing::debug!(resource = R::NAME, id, "Updating");
        let request = self
            .api
            .authorized(Method::PATCH, &self.item_url(id))?
            .json(patch);
        let response = self.api.dispatch(request, Target::item(R::NAME, id)).await?;
        ApiClient::decode(response, R::NAME).await
    }

    /// DELETE one record. The response body, if any, is ignored.
    pub async fn remove(&self, id: &str) -> Result<(), ApiError> {
        tracing::debug!(resource = R::NAME, id, "Removing");
        let request = self.api.authorized(Method::DELETE, &self.item_url(id))?;
        self.api.dispatch(request, Target::item(R::NAME, id)).await?;
        Ok(())
    }
}

impl ResourceClient<Orders> {
    pub async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        note: Option<&str>,
    ) -> Result<Order, ApiError> {
        #[derive(Serialize)]
        struct StatusChange<'a> {
            status: OrderStatus,
            #[serde(skip_serializing_if = "Option::is_none")]
            note: Option<&'a str>,
        }

        let note = note.map(str::trim).filter(|n| !n.is_empty());
        let request = self
            .api
            .authorized(Method::PATCH, &format!("{}/status", self.item_url(id)))?
            .json(&StatusChange { status, note });
        let response = self.api.dispatch(request, Target::item(Orders::NAME, id)).await?;
        ApiClient::decode(response, Orders::NAME).await
    }
}

impl ResourceClient<Users> {
    /// Flip an account on or off. The server's body is not relied upon; the
    /// caller patches its local copy on success.
    pub async fn set_active(&self, id: &str, active: bool) -> Result<(), ApiError> {
        let action = if active { "activate" } else { "deactivate" };
        let request = self
            .api
            .authorized(Method::PATCH, &format!("{}/{}", self.item_url(id), action))?;
        self.api.dispatch(request, Target::item(Users::NAME, id)).await?;
        Ok(())
    }
}

#[async_trait]
impl<R: Resource> CollectionSource<R::Record> for ResourceClient<R> {
    async fn fetch_page(&self, query: &ListQuery) -> Result<Page<R::Record>, ApiError> {
        self.list(query).await
    }
}

#[async_trait]
impl<R: Resource> RemoveSource for ResourceClient<R> {
    async fn remove_one(&self, id: &str) -> Result<(), ApiError> {
        self.remove(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_validation() {
        assert!(ListQuery::new(1, 10).validate().is_ok());
        assert!(matches!(
            ListQuery::new(0, 10).validate(),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            ListQuery::new(1, 0).validate(),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_query_pairs_include_params() {
        let query = ListQuery::new(2, 25).with_params(vec![("category".into(), "image".into())]);
        assert_eq!(
            query.pairs(),
            vec![
                ("page".to_string(), "2".to_string()),
                ("limit".to_string(), "25".to_string()),
                ("category".to_string(), "image".to_string()),
            ]
        );
    }

    #[test]
    fn test_decode_page_keyed_envelope() {
        let value = json!({
            "categories": [{"_id": "c1", "name": "Homme", "slug": "homme"}],
            "total": 37,
            "page": 1,
            "limit": 10
        });
        let page: Page<Category> = decode_page(value, "categories", &ListQuery::new(1, 10)).unwrap();
        assert_eq!(page.total, 37);
        assert_eq!(page.items[0].id.as_deref(), Some("c1"));
    }

    #[test]
    fn test_decode_page_bare_array() {
        let value = json!([
            {"id": "u1", "email": "a@k", "role": "admin", "isActive": true},
            {"_id": "u2", "email": "b@k", "role": "user"}
        ]);
        let page: Page<User> = decode_page(value, "users", &ListQuery::new(1, 10)).unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[1].id.as_deref(), Some("u2"));
    }

    #[test]
    fn test_decode_page_data_envelope_without_total() {
        let value = json!({"data": [{"name": "Sauvage"}]});
        let page: Page<Product> = decode_page(value, "products", &ListQuery::new(3, 5)).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.page, 3);
        assert_eq!(page.limit, 5);
    }

    #[test]
    fn test_decode_page_rejects_missing_items() {
        let value = json!({"total": 3});
        let result: Result<Page<Product>, _> = decode_page(value, "products", &ListQuery::new(1, 10));
        assert!(matches!(result, Err(ApiError::Parse { .. })));
    }
}
