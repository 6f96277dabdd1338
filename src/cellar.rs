//! Client-side copy of the wine cellar

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use log::{debug, info};
use uuid::Uuid;

use crate::api::{RequestMode, SommelierClient, WineAck};
use crate::error::{Error, Result};
use crate::models::{NewWine, Wine, WineUpdate};

/// Cellar list orderings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    Name,
    YearNewest,
    YearOldest,
    Producer,
    Added,
}

impl SortBy {
    pub const ALL: [SortBy; 5] = [
        SortBy::Name,
        SortBy::YearNewest,
        SortBy::YearOldest,
        SortBy::Producer,
        SortBy::Added,
    ];

    /// Translation key of the option label
    pub fn label_key(&self) -> &'static str {
        match self {
            Self::Name => "cellar.sortOptions.name",
            Self::YearNewest => "cellar.sortOptions.yearNewest",
            Self::YearOldest => "cellar.sortOptions.yearOldest",
            Self::Producer => "cellar.sortOptions.producer",
            Self::Added => "cellar.sortOptions.added",
        }
    }

    fn compare(&self, a: &Wine, b: &Wine) -> Ordering {
        match self {
            Self::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            Self::YearNewest => b.year.cmp(&a.year),
            Self::YearOldest => a.year.cmp(&b.year),
            Self::Producer => a.producer.to_lowercase().cmp(&b.producer.to_lowercase()),
            // Newest first; wines without a date sink to the end
            Self::Added => b.added_date.cmp(&a.added_date),
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Name => "name",
            Self::YearNewest => "year-newest",
            Self::YearOldest => "year-oldest",
            Self::Producer => "producer",
            Self::Added => "added",
        };
        f.write_str(s)
    }
}

impl FromStr for SortBy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|sort| sort.to_string() == s)
            .ok_or_else(|| Error::general(format!("unknown sort order: {}", s)))
    }
}

/// Cached wine list of the signed-in user
#[derive(Debug, Clone, Default)]
pub struct Cellar {
    wines: Vec<Wine>,
}

impl Cellar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_wines(wines: Vec<Wine>) -> Self {
        Self { wines }
    }

    pub fn wines(&self) -> &[Wine] {
        &self.wines
    }

    pub fn len(&self) -> usize {
        self.wines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wines.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Wine> {
        self.wines.iter().find(|w| w.id == id)
    }

    /// Replace the cached list with the server's
    pub async fn refresh(&mut self, client: &SommelierClient) -> Result<()> {
        self.refresh_with(client, RequestMode::Immediate).await
    }

    pub async fn refresh_with(&mut self, client: &SommelierClient, mode: RequestMode) -> Result<()> {
        self.wines = client.list_wines_with(mode).await?;
        debug!("Cellar refreshed with {} wines", self.wines.len());
        Ok(())
    }

    /// Create a wine and put it at the top of the list
    pub async fn add(&mut self, client: &SommelierClient, wine: NewWine) -> Result<&Wine> {
        let wine = wine.validate()?;
        let ack = accepted(client.add_wine(&wine).await?)?;

        let id = ack.id.unwrap_or_else(|| Uuid::new_v4().to_string());
        info!("Added wine {} to cellar", id);
        self.wines.insert(0, wine.into_wine(id, Utc::now()));
        Ok(&self.wines[0])
    }

    /// Update a wine. The cached entry changes only when the server echoes an id.
    pub async fn update(&mut self, client: &SommelierClient, id: &str, update: WineUpdate) -> Result<()> {
        let ack = accepted(client.update_wine(id, &update).await?)?;

        if ack.id.is_some() {
            if let Some(wine) = self.wines.iter_mut().find(|w| w.id == id) {
                wine.apply(&update);
            }
        }
        Ok(())
    }

    pub async fn delete(&mut self, client: &SommelierClient, id: &str) -> Result<()> {
        client.delete_wine(id).await?;
        self.wines.retain(|w| w.id != id);
        Ok(())
    }

    /// Wines whose name or producer contains `query`, in `sort` order
    pub fn view(&self, query: &str, sort: SortBy) -> Vec<&Wine> {
        let query = query.trim().to_lowercase();
        let mut wines: Vec<&Wine> = self
            .wines
            .iter()
            .filter(|w| {
                query.is_empty()
                    || w.name.to_lowercase().contains(&query)
                    || w.producer.to_lowercase().contains(&query)
            })
            .collect();
        wines.sort_by(|a, b| sort.compare(a, b));
        wines
    }

    /// Oldest and newest vintage in the cellar
    pub fn vintage_range(&self) -> Option<(i32, i32)> {
        let oldest = self.wines.iter().map(|w| w.year).min()?;
        let newest = self.wines.iter().map(|w| w.year).max()?;
        Some((oldest, newest))
    }
}

fn accepted(ack: WineAck) -> Result<WineAck> {
    match ack.error {
        Some(error) => Err(Error::general(error)),
        None => Ok(ack),
    }
}
