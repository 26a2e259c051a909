//! Company-registry lookups: scrape the public register's officers
//! pages into structured records.

pub mod companies_house;
pub mod types;

pub use companies_house::{normalize_company_name, CompaniesHouseScraper};
pub use types::{CompanyRegistry, Officer, OfficerLookup};
