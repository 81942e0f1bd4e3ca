use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// The REST surface of a Nanoleaf controller.
///
/// Paths are relative to the authenticated API root, e.g. `/effects/select`
/// for `http://<host>:16021/api/v1/<token>/effects/select`.
///
/// The helper clients ([`crate::effects::EffectsClient`],
/// [`crate::layout::LayoutClient`], ...) only ever talk to the device through
/// this trait, so any transport can back them.
#[async_trait]
pub trait NanoleafApi: Send + Sync {
    /// Issues a `GET` and decodes the body as JSON.
    async fn get_json(&self, path: &str) -> Result<Value>;

    /// Issues a `PUT` with a JSON body.
    ///
    /// # Returns
    /// The decoded response body, or [`Value::Null`] when the device answers
    /// without content (it usually replies `204 No Content`).
    async fn put_json(&self, path: &str, body: &Value) -> Result<Value>;
}

#[async_trait]
impl<T: NanoleafApi + ?Sized> NanoleafApi for &T {
    async fn get_json(&self, path: &str) -> Result<Value> {
        (**self).get_json(path).await
    }

    async fn put_json(&self, path: &str, body: &Value) -> Result<Value> {
        (**self).put_json(path, body).await
    }
}
