//! Company and vessel registry services.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

use super::models::{Company, Vessel};
use super::queries;
use super::requests::{CompanyUpdate, CreateCompanyRequest, CreateVesselRequest, VesselUpdate};

pub async fn list_companies(pool: &PgPool, include_inactive: bool) -> Result<Vec<Company>, AppError> {
    queries::list_companies(pool, include_inactive).await
}

pub async fn get_company(pool: &PgPool, id: Uuid) -> Result<Company, AppError> {
    queries::get_company(pool, id).await?.ok_or(AppError::NotFound)
}

/// Register a company. Names and tax ids are unique.
pub async fn create_company(
    pool: &PgPool,
    request: CreateCompanyRequest,
) -> Result<Company, AppError> {
    request.validate()?;
    let company = queries::insert_company(pool, &request.into_company()?).await?;

    tracing::info!(company = %company.id, name = %company.name, "Registered company");
    Ok(company)
}

/// Apply a partial update to an active company
pub async fn update_company(
    pool: &PgPool,
    id: Uuid,
    update: CompanyUpdate,
) -> Result<Company, AppError> {
    update.validate()?;

    let mut company = queries::get_company(pool, id)
        .await?
        .filter(|c| c.active)
        .ok_or(AppError::NotFound)?;
    update.apply(&mut company)?;

    let company = queries::save_company(pool, &company).await?;
    tracing::info!(company = %company.id, "Updated company");
    Ok(company)
}

/// Soft-delete a company. Its visits and vessels are kept.
pub async fn deactivate_company(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    if !queries::deactivate_company(pool, id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!(company = %id, "Deactivated company");
    Ok(())
}

pub async fn list_vessels(
    pool: &PgPool,
    company_id: Option<Uuid>,
    include_inactive: bool,
) -> Result<Vec<Vessel>, AppError> {
    queries::list_vessels(pool, company_id, include_inactive).await
}

pub async fn get_vessel(pool: &PgPool, id: Uuid) -> Result<Vessel, AppError> {
    queries::get_vessel(pool, id).await?.ok_or(AppError::NotFound)
}

/// Register a vessel under an active company
pub async fn create_vessel(pool: &PgPool, request: CreateVesselRequest) -> Result<Vessel, AppError> {
    request.validate()?;

    let owner = queries::get_company(pool, request.company_id)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_active_owner(&owner)?;

    let vessel = queries::insert_vessel(pool, &request.into_vessel()).await?;
    tracing::info!(
        vessel = %vessel.id,
        company = %vessel.company_id,
        length_m = ?vessel.length_m,
        "Registered vessel"
    );
    Ok(vessel)
}

/// Apply a partial update to an active vessel
pub async fn update_vessel(pool: &PgPool, id: Uuid, update: VesselUpdate) -> Result<Vessel, AppError> {
    update.validate()?;

    let mut vessel = queries::get_vessel(pool, id)
        .await?
        .filter(|v| v.active)
        .ok_or(AppError::NotFound)?;
    update.apply(&mut vessel);

    let vessel = queries::save_vessel(pool, &vessel).await?;
    tracing::info!(vessel = %vessel.id, length_m = ?vessel.length_m, "Updated vessel");
    Ok(vessel)
}

pub async fn deactivate_vessel(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    if !queries::deactivate_vessel(pool, id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!(vessel = %id, "Deactivated vessel");
    Ok(())
}

/// New vessels and visits may only reference an active company
pub fn ensure_active_owner(company: &Company) -> Result<(), AppError> {
    if !company.active {
        return Err(AppError::validation(format!(
            "company {} is inactive",
            company.id
        )));
    }
    Ok(())
}

/// A visit must use an active vessel owned by the visiting company
pub fn ensure_vessel_usable(vessel: &Vessel, company_id: Uuid) -> Result<(), AppError> {
    if vessel.company_id != company_id {
        return Err(AppError::validation(format!(
            "vessel {} does not belong to company {}",
            vessel.id, company_id
        )));
    }
    if !vessel.active {
        return Err(AppError::validation(format!("vessel {} is inactive", vessel.id)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::companies::models::fixtures::{company, vessel};

    #[test]
    fn test_inactive_company_cannot_own_new_vessels() {
        let mut owner = company("Abrolhos Turismo");
        assert!(ensure_active_owner(&owner).is_ok());

        owner.active = false;
        assert!(matches!(
            ensure_active_owner(&owner),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_vessel_must_belong_to_company() {
        let owner = company("Abrolhos Turismo");
        let boat = vessel(owner.id, Some(12.0));
        assert!(ensure_vessel_usable(&boat, owner.id).is_ok());

        let err = ensure_vessel_usable(&boat, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("does not belong")));
    }

    #[test]
    fn test_inactive_vessel_is_unusable() {
        let owner = company("Abrolhos Turismo");
        let mut boat = vessel(owner.id, None);
        boat.active = false;

        let err = ensure_vessel_usable(&boat, owner.id).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("inactive")));
    }
}
