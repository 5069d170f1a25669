//! Bands service

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        band::{Band, BandQuery, CreateBand, TrendingBand, UpdateBand},
        PageRequest, Paginated,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BandsService {
    repository: Repository,
}

impl BandsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn create(&self, data: CreateBand) -> AppResult<Band> {
        data.validate()?;
        if data.name.trim().is_empty() {
            return Err(AppError::Validation("Band name is required".to_string()));
        }
        let band = self.repository.bands.create(&data).await?;
        tracing::info!(band_id = %band.id, name = %band.name, "Band created");
        Ok(band)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Band> {
        self.repository.bands.get_by_id(id).await
    }

    pub async fn search(&self, query: &BandQuery) -> AppResult<Paginated<Band>> {
        let page = PageRequest::new(query.page, query.limit);
        let (bands, total) = self.repository.bands.search(query, page).await?;
        Ok(Paginated::new(bands, total, page))
    }

    pub async fn update(&self, id: Uuid, data: UpdateBand) -> AppResult<Band> {
        data.validate()?;
        if data.is_empty() {
            return Err(AppError::Validation("No valid fields to update".to_string()));
        }
        self.repository.bands.update(id, &data).await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repository.bands.deactivate(id).await?;
        tracing::info!(band_id = %id, "Band deactivated");
        Ok(())
    }

    pub async fn popular(&self, limit: i64) -> AppResult<Vec<Band>> {
        self.repository.bands.popular(limit).await
    }

    pub async fn trending(&self, limit: i64) -> AppResult<Vec<TrendingBand>> {
        self.repository.bands.trending(limit).await
    }

    pub async fn genres(&self) -> AppResult<Vec<String>> {
        self.repository.bands.genres().await
    }
}
