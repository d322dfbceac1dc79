//! Seed the database with demo stores and staff.
//!
//! Staff are inserted without login credentials; give them one later with
//! a `PUT` that supplies a password.

use storedesk_api::db::{StaffRepository, StoreRepository};
use storedesk_api::models::{NewStaff, NewStore, Store};
use storedesk_core::{ActivityStatus, Email, StaffRole};

use super::{CliError, connect};

struct StoreSeed {
    name: &'static str,
    address: &'static str,
    phone: &'static str,
    email: &'static str,
    status: ActivityStatus,
}

struct StaffSeed {
    first: &'static str,
    last: &'static str,
    phone: &'static str,
    /// Index into the seeded stores.
    store: usize,
    status: ActivityStatus,
}

const STORES: &[StoreSeed] = &[
    StoreSeed {
        name: "Downtown Store",
        address: "123 Main Street, City Center",
        phone: "+1-555-0101",
        email: "downtown@store.com",
        status: ActivityStatus::Active,
    },
    StoreSeed {
        name: "Mall Location",
        address: "456 Shopping Mall, North District",
        phone: "+1-555-0102",
        email: "mall@store.com",
        status: ActivityStatus::Active,
    },
    StoreSeed {
        name: "Airport Branch",
        address: "789 Airport Road, Terminal 2",
        phone: "+1-555-0103",
        email: "airport@store.com",
        status: ActivityStatus::Active,
    },
    StoreSeed {
        name: "Suburban Outlet",
        address: "321 Suburban Avenue, West Side",
        phone: "+1-555-0104",
        email: "suburban@store.com",
        status: ActivityStatus::Inactive,
    },
    StoreSeed {
        name: "City Plaza",
        address: "567 Plaza Drive, Downtown",
        phone: "+1-555-0105",
        email: "plaza@store.com",
        status: ActivityStatus::Active,
    },
];

const MANAGERS: &[StaffSeed] = &[
    StaffSeed {
        first: "Robert",
        last: "Taylor",
        phone: "+1-555-2001",
        store: 0,
        status: ActivityStatus::Active,
    },
    StaffSeed {
        first: "Jennifer",
        last: "Martinez",
        phone: "+1-555-2002",
        store: 1,
        status: ActivityStatus::Active,
    },
    StaffSeed {
        first: "William",
        last: "Garcia",
        phone: "+1-555-2003",
        store: 2,
        status: ActivityStatus::Active,
    },
    StaffSeed {
        first: "Amanda",
        last: "Rodriguez",
        phone: "+1-555-2004",
        store: 3,
        status: ActivityStatus::Inactive,
    },
];

const REPRESENTATIVES: &[StaffSeed] = &[
    StaffSeed {
        first: "John",
        last: "Smith",
        phone: "+1-555-1001",
        store: 0,
        status: ActivityStatus::Active,
    },
    StaffSeed {
        first: "Sarah",
        last: "Johnson",
        phone: "+1-555-1002",
        store: 0,
        status: ActivityStatus::Active,
    },
    StaffSeed {
        first: "Michael",
        last: "Brown",
        phone: "+1-555-1003",
        store: 1,
        status: ActivityStatus::Active,
    },
    StaffSeed {
        first: "Emily",
        last: "Davis",
        phone: "+1-555-1004",
        store: 1,
        status: ActivityStatus::Active,
    },
    StaffSeed {
        first: "David",
        last: "Wilson",
        phone: "+1-555-1005",
        store: 2,
        status: ActivityStatus::Active,
    },
    StaffSeed {
        first: "Lisa",
        last: "Anderson",
        phone: "+1-555-1006",
        store: 3,
        status: ActivityStatus::Inactive,
    },
];

fn parse_email(raw: &str) -> Result<Email, CliError> {
    Email::parse(raw).map_err(|_| CliError::InvalidEmail(raw.to_owned()))
}

impl StaffSeed {
    fn to_new_staff(&self, stores: &[Store]) -> Result<Option<NewStaff>, CliError> {
        let Some(store) = stores.get(self.store) else {
            return Ok(None);
        };

        Ok(Some(NewStaff {
            name: format!("{} {}", self.first, self.last),
            email: parse_email(&format!(
                "{}.{}@store.com",
                self.first.to_lowercase(),
                self.last.to_lowercase()
            ))?,
            phone: self.phone.to_owned(),
            store_id: store.id,
            status: self.status,
        }))
    }
}

/// Insert the demo data.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    let store_repo = StoreRepository::new(&pool);
    let mut stores = Vec::with_capacity(STORES.len());
    for seed in STORES {
        let store = store_repo
            .create(&NewStore {
                name: seed.name.to_owned(),
                address: seed.address.to_owned(),
                phone: seed.phone.to_owned(),
                email: parse_email(seed.email)?,
                status: seed.status,
            })
            .await?;
        stores.push(store);
    }
    tracing::info!("Seeded {} stores", stores.len());

    for (role, seeds) in [
        (StaffRole::StoreManager, MANAGERS),
        (StaffRole::StoreRepresentative, REPRESENTATIVES),
    ] {
        let repo = StaffRepository::new(&pool, role);
        let mut count = 0;
        for seed in seeds {
            let Some(new) = seed.to_new_staff(&stores)? else {
                tracing::warn!("No stores found. Skipping {} {}", seed.first, seed.last);
                continue;
            };
            repo.create_unlinked(&new).await?;
            count += 1;
        }
        tracing::info!(role = %role, "Seeded {count} staff records");
    }

    tracing::info!("Seeding complete!");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_emails_are_valid() {
        for seed in STORES {
            assert!(Email::parse(seed.email).is_ok(), "{}", seed.email);
        }
    }

    #[test]
    fn test_staff_reference_seeded_stores() {
        for seed in MANAGERS.iter().chain(REPRESENTATIVES) {
            assert!(seed.store < STORES.len());
        }
    }

    #[test]
    fn test_staff_without_store_is_skipped() {
        let new = MANAGERS.first().unwrap().to_new_staff(&[]).unwrap();
        assert!(new.is_none());
    }
}
