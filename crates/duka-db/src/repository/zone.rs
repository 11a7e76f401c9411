//! # Zone Repository
//!
//! Database operations for delivery zones.
//!
//! Zones are returned in insertion order. The matcher's "first in input
//! order" tie-break therefore means "first created".

use duka_core::delivery::find_zone;
use duka_core::validation::{validate_tenant_id, validate_zone};
use duka_core::{Coordinate, DeliveryZone, DEFAULT_TENANT_ID};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

const ZONE_COLUMNS: &str = r#"
    id, tenant_id, name, latitude, longitude, radius_km,
    free_delivery, fee, estimated_minutes, is_active, created_at
"#;

/// Repository for delivery zone database operations.
#[derive(Debug, Clone)]
pub struct ZoneRepository {
    pool: SqlitePool,
}

impl ZoneRepository {
    /// Creates a new ZoneRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ZoneRepository { pool }
    }

    /// Inserts a zone after validating it.
    pub async fn insert(&self, zone: &DeliveryZone) -> DbResult<()> {
        validate_tenant_id(&zone.tenant_id)?;
        validate_zone(zone)?;

        debug!(id = %zone.id, name = %zone.name, radius_km = zone.radius_km, "Inserting zone");

        sqlx::query(
            r#"
            INSERT INTO delivery_zones (
                id, tenant_id, name, latitude, longitude, radius_km,
                free_delivery, fee, estimated_minutes, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&zone.id)
        .bind(&zone.tenant_id)
        .bind(&zone.name)
        .bind(zone.center.latitude)
        .bind(zone.center.longitude)
        .bind(zone.radius_km)
        .bind(zone.free_delivery)
        .bind(zone.fee)
        .bind(zone.estimated_minutes)
        .bind(zone.is_active)
        .bind(zone.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a zone by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<DeliveryZone>> {
        let sql = format!("SELECT {ZONE_COLUMNS} FROM delivery_zones WHERE id = ?1");
        let zone = sqlx::query_as::<_, DeliveryZone>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(zone)
    }

    /// Active zones in insertion order.
    pub async fn list_active(&self) -> DbResult<Vec<DeliveryZone>> {
        let sql = format!(
            "SELECT {ZONE_COLUMNS} FROM delivery_zones WHERE tenant_id = ?1 AND is_active = 1 ORDER BY rowid"
        );
        let zones = sqlx::query_as::<_, DeliveryZone>(&sql)
            .bind(DEFAULT_TENANT_ID)
            .fetch_all(&self.pool)
            .await?;

        Ok(zones)
    }

    /// Enables or disables a zone.
    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE delivery_zones SET is_active = ?1 WHERE id = ?2")
            .bind(active)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("DeliveryZone", id));
        }

        info!(id = %id, active, "Zone active flag changed");
        Ok(())
    }

    /// The active zone serving `point`, or `None` outside the service area.
    pub async fn match_point(&self, point: Coordinate) -> DbResult<Option<DeliveryZone>> {
        let zones = self.list_active().await?;
        let matched = find_zone(point, &zones).cloned();

        debug!(
            latitude = point.latitude,
            longitude = point.longitude,
            zone = matched.as_ref().map(|z| z.name.as_str()).unwrap_or("none"),
            "Zone lookup"
        );

        Ok(matched)
    }
}
