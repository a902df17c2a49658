//! Request DTOs for company and vessel endpoints.

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::pricing::requests::{double_option, validate_length};

use super::models::{Company, Vessel, VESSEL_KINDS};

/// Request to register a tour company
#[derive(Debug, Deserialize)]
pub struct CreateCompanyRequest {
    pub name: String,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
}

impl CreateCompanyRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_name("name", &self.name)?;
        if let Some(tax_id) = &self.tax_id {
            normalize_tax_id(tax_id)?;
        }
        validate_contact(self.contact_phone.as_deref(), self.contact_email.as_deref())
    }

    pub fn into_company(self) -> Result<Company, AppError> {
        Ok(Company {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            tax_id: self.tax_id.as_deref().map(normalize_tax_id).transpose()?,
            contact_name: self.contact_name,
            contact_phone: self.contact_phone,
            contact_email: self.contact_email,
            active: true,
            created_at: Utc::now(),
        })
    }
}

/// Partial update of a company. `null` clears an optional field.
#[derive(Debug, Default, Deserialize)]
pub struct CompanyUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub tax_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub contact_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub contact_phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub contact_email: Option<Option<String>>,
}

impl CompanyUpdate {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        if let Some(Some(tax_id)) = &self.tax_id {
            normalize_tax_id(tax_id)?;
        }
        validate_contact(
            self.contact_phone.as_ref().and_then(|p| p.as_deref()),
            self.contact_email.as_ref().and_then(|e| e.as_deref()),
        )
    }

    pub fn apply(self, company: &mut Company) -> Result<(), AppError> {
        if let Some(name) = self.name {
            company.name = name.trim().to_string();
        }
        if let Some(tax_id) = self.tax_id {
            company.tax_id = tax_id.as_deref().map(normalize_tax_id).transpose()?;
        }
        if let Some(contact_name) = self.contact_name {
            company.contact_name = contact_name;
        }
        if let Some(contact_phone) = self.contact_phone {
            company.contact_phone = contact_phone;
        }
        if let Some(contact_email) = self.contact_email {
            company.contact_email = contact_email;
        }
        Ok(())
    }
}

/// Request to register a vessel under a company
#[derive(Debug, Deserialize)]
pub struct CreateVesselRequest {
    pub company_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub capacity: Option<i32>,
    #[serde(default)]
    pub length_m: Option<f64>,
    #[serde(default)]
    pub registration: Option<String>,
}

impl CreateVesselRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_name("name", &self.name)?;
        validate_kind(self.kind.as_deref())?;
        validate_capacity(self.capacity)?;
        validate_length("length_m", self.length_m)
    }

    pub fn into_vessel(self) -> Vessel {
        Vessel {
            id: Uuid::new_v4(),
            company_id: self.company_id,
            name: self.name.trim().to_string(),
            kind: self.kind,
            capacity: self.capacity,
            length_m: self.length_m,
            registration: self.registration,
            active: true,
            created_at: Utc::now(),
        }
    }
}

/// Partial update of a vessel.
///
/// A vessel never changes owner. Changing `length_m` affects only visits
/// priced afterwards; stored charges are not recomputed.
#[derive(Debug, Default, Deserialize)]
pub struct VesselUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub kind: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub capacity: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub length_m: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub registration: Option<Option<String>>,
}

impl VesselUpdate {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        if let Some(kind) = &self.kind {
            validate_kind(kind.as_deref())?;
        }
        if let Some(capacity) = self.capacity {
            validate_capacity(capacity)?;
        }
        if let Some(length_m) = self.length_m {
            validate_length("length_m", length_m)?;
        }
        Ok(())
    }

    pub fn apply(self, vessel: &mut Vessel) {
        if let Some(name) = self.name {
            vessel.name = name.trim().to_string();
        }
        if let Some(kind) = self.kind {
            vessel.kind = kind;
        }
        if let Some(capacity) = self.capacity {
            vessel.capacity = capacity;
        }
        if let Some(length_m) = self.length_m {
            vessel.length_m = length_m;
        }
        if let Some(registration) = self.registration {
            vessel.registration = registration;
        }
    }
}

/// Query parameters for listing companies
#[derive(Debug, Default, Deserialize)]
pub struct ListCompaniesQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// Query parameters for listing vessels
#[derive(Debug, Default, Deserialize)]
pub struct ListVesselsQuery {
    #[serde(default)]
    pub company_id: Option<Uuid>,
    #[serde(default)]
    pub include_inactive: bool,
}

fn validate_name(field: &str, name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn validate_kind(kind: Option<&str>) -> Result<(), AppError> {
    match kind {
        Some(k) if !VESSEL_KINDS.contains(&k) => Err(AppError::validation(format!(
            "kind must be one of {}",
            VESSEL_KINDS.join(", ")
        ))),
        _ => Ok(()),
    }
}

fn validate_capacity(capacity: Option<i32>) -> Result<(), AppError> {
    match capacity {
        Some(c) if c < 0 => Err(AppError::validation("capacity must not be negative")),
        _ => Ok(()),
    }
}

fn validate_contact(phone: Option<&str>, email: Option<&str>) -> Result<(), AppError> {
    if let Some(phone) = phone {
        let digits = phone.chars().filter(char::is_ascii_digit).count();
        if !(10..=11).contains(&digits) {
            return Err(AppError::validation(
                "contact_phone must have 10 or 11 digits including area code",
            ));
        }
    }
    if let Some(email) = email {
        if !looks_like_email(email) {
            return Err(AppError::validation(format!("invalid contact_email '{}'", email)));
        }
    }
    Ok(())
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .rsplit_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && tld.len() >= 2)
        }
        None => false,
    }
}

/// Check a CNPJ and return it as `XX.XXX.XXX/XXXX-XX`.
///
/// Punctuation is optional on input; the two check digits must match.
pub fn normalize_tax_id(tax_id: &str) -> Result<String, AppError> {
    let digits: Vec<u32> = tax_id.chars().filter_map(|c| c.to_digit(10)).collect();
    let invalid = || AppError::validation(format!("invalid tax_id '{}'", tax_id));

    if digits.len() != 14 || digits.iter().all(|d| *d == digits[0]) {
        return Err(invalid());
    }
    let first = cnpj_check_digit(&digits[..12], &[5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2]);
    let second = cnpj_check_digit(&digits[..13], &[6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2]);
    if digits[12] != first || digits[13] != second {
        return Err(invalid());
    }

    let s: String = digits.iter().filter_map(|d| char::from_digit(*d, 10)).collect();
    Ok(format!(
        "{}.{}.{}/{}-{}",
        &s[0..2],
        &s[2..5],
        &s[5..8],
        &s[8..12],
        &s[12..14]
    ))
}

fn cnpj_check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    match 11 - sum % 11 {
        d if d >= 10 => 0,
        d => d,
    }
}
