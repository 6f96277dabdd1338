//! Cellar endpoints

use reqwest::Method;
use serde_json::Value;

use super::types::{WineAck, WineList};
use super::{RequestMode, SommelierClient};
use crate::error::Result;
use crate::models::{NewWine, Wine, WineUpdate};

impl SommelierClient {
    /// Fetch the signed-in user's cellar
    pub async fn list_wines(&self) -> Result<Vec<Wine>> {
        self.list_wines_with(RequestMode::Immediate).await
    }

    /// Fetch the cellar with an explicit scheduling mode
    pub async fn list_wines_with(&self, mode: RequestMode) -> Result<Vec<Wine>> {
        let list: WineList = self.request(Method::GET, "/wines", None::<&()>, mode).await?;
        Ok(list.into())
    }

    pub async fn add_wine(&self, wine: &NewWine) -> Result<WineAck> {
        self.request(Method::POST, "/wines", Some(wine), RequestMode::Immediate)
            .await
    }

    pub async fn update_wine(&self, id: &str, update: &WineUpdate) -> Result<WineAck> {
        self.request(
            Method::PUT,
            &format!("/wines/{}", id),
            Some(update),
            RequestMode::Immediate,
        )
        .await
    }

    pub async fn delete_wine(&self, id: &str) -> Result<()> {
        let _: Value = self
            .request(
                Method::DELETE,
                &format!("/wines/{}", id),
                None::<&()>,
                RequestMode::Immediate,
            )
            .await?;
        Ok(())
    }
}
