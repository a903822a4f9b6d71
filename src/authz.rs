use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::job::{Job, STATUS_ACTIVE};

/// Company association carried by a regular caller, resolved once per
/// request by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyRef {
    pub id: Uuid,
    pub name: String,
}

/// Caller context for the duration of a request. Superusers bypass both the
/// visibility scope and the ownership checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    Regular {
        user_id: Uuid,
        company: Option<CompanyRef>,
    },
    Superuser {
        user_id: Uuid,
    },
}

impl Identity {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Identity::Anonymous => None,
            Identity::Regular { user_id, .. } | Identity::Superuser { user_id } => Some(*user_id),
        }
    }
}

/// The subset of job records a caller may read, expressed as a predicate
/// the query engine intersects with user-supplied filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityScope {
    ActiveOnly,
    ActiveOrCreatedBy(Uuid),
    All,
}

pub fn visibility_scope(identity: &Identity) -> VisibilityScope {
    match identity {
        Identity::Anonymous => VisibilityScope::ActiveOnly,
        Identity::Regular { user_id, .. } => VisibilityScope::ActiveOrCreatedBy(*user_id),
        Identity::Superuser { .. } => VisibilityScope::All,
    }
}

impl VisibilityScope {
    pub fn allows(&self, job: &Job) -> bool {
        match self {
            VisibilityScope::ActiveOnly => job.status == STATUS_ACTIVE,
            VisibilityScope::ActiveOrCreatedBy(user_id) => {
                job.status == STATUS_ACTIVE || job.created_by == Some(*user_id)
            }
            VisibilityScope::All => true,
        }
    }
}

/// Creation is scoped to the caller's own company; a missing association is
/// itself a denial. Returns the creator id to stamp on the record.
pub fn check_can_create(identity: &Identity, company_name: &str) -> Result<Uuid> {
    match identity {
        Identity::Anonymous => Err(Error::Unauthorized(
            "Authentication required".to_string(),
        )),
        Identity::Superuser { user_id } => Ok(*user_id),
        Identity::Regular { user_id, company } => match company {
            Some(company) if company.name == company_name => Ok(*user_id),
            _ => Err(Error::Forbidden(
                "You don't have permission to create jobs for this company".to_string(),
            )),
        },
    }
}

/// Ownership check for update/delete. Cross-owner job mutations are 403,
/// unlike cross-owner domain deletions which surface as 404.
pub fn check_can_mutate(identity: &Identity, job: &Job, action: &str) -> Result<Uuid> {
    match identity {
        Identity::Anonymous => Err(Error::Unauthorized(
            "Authentication required".to_string(),
        )),
        Identity::Superuser { user_id } => Ok(*user_id),
        Identity::Regular { user_id, .. } => {
            if job.created_by == Some(*user_id) {
                Ok(*user_id)
            } else {
                Err(Error::Forbidden(format!(
                    "You don't have permission to {} this job",
                    action
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::{STATUS_EXPIRED, STATUS_SCHEDULED};
    use chrono::{NaiveDate, Utc};

    fn job(status: &str, created_by: Option<Uuid>) -> Job {
        Job {
            id: Uuid::new_v4(),
            title: "Engineer".to_string(),
            description: "desc".to_string(),
            location: "Berlin".to_string(),
            salary_type: "annually".to_string(),
            salary_currency: "EUR".to_string(),
            salary_min: 50_000,
            salary_max: 90_000,
            company_name: "Acme".to_string(),
            posting_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            expiration_date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            required_skills: vec![],
            status: status.to_string(),
            created_by,
            last_updated_by: created_by,
            created_at: Utc::now(),
            last_updated_at: Utc::now(),
        }
    }

    #[test]
    fn anonymous_sees_only_active() {
        let scope = visibility_scope(&Identity::Anonymous);
        assert!(scope.allows(&job(STATUS_ACTIVE, None)));
        assert!(!scope.allows(&job(STATUS_EXPIRED, None)));
        assert!(!scope.allows(&job(STATUS_SCHEDULED, None)));
    }

    #[test]
    fn regular_sees_active_and_own() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let scope = visibility_scope(&Identity::Regular {
            user_id: me,
            company: None,
        });
        assert!(scope.allows(&job(STATUS_ACTIVE, Some(other))));
        assert!(scope.allows(&job(STATUS_SCHEDULED, Some(me))));
        assert!(!scope.allows(&job(STATUS_SCHEDULED, Some(other))));
    }

    #[test]
    fn superuser_sees_everything() {
        let scope = visibility_scope(&Identity::Superuser {
            user_id: Uuid::new_v4(),
        });
        assert!(scope.allows(&job(STATUS_EXPIRED, None)));
    }

    #[test]
    fn create_requires_matching_company() {
        let user_id = Uuid::new_v4();
        let identity = Identity::Regular {
            user_id,
            company: Some(CompanyRef {
                id: Uuid::new_v4(),
                name: "Acme".to_string(),
            }),
        };
        assert_eq!(check_can_create(&identity, "Acme").unwrap(), user_id);
        assert!(matches!(
            check_can_create(&identity, "Other Corp"),
            Err(Error::Forbidden(_))
        ));
    }

    #[test]
    fn create_without_company_association_is_denied() {
        let identity = Identity::Regular {
            user_id: Uuid::new_v4(),
            company: None,
        };
        assert!(matches!(
            check_can_create(&identity, "Acme"),
            Err(Error::Forbidden(_))
        ));
    }

    #[test]
    fn superuser_creates_for_any_company() {
        let user_id = Uuid::new_v4();
        let identity = Identity::Superuser { user_id };
        assert_eq!(check_can_create(&identity, "Anything").unwrap(), user_id);
    }

    #[test]
    fn only_creator_or_superuser_mutates() {
        let me = Uuid::new_v4();
        let target = job(STATUS_ACTIVE, Some(me));
        let identity = Identity::Regular {
            user_id: me,
            company: None,
        };
        assert!(check_can_mutate(&identity, &target, "update").is_ok());

        let stranger = Identity::Regular {
            user_id: Uuid::new_v4(),
            company: None,
        };
        let err = check_can_mutate(&stranger, &target, "delete").unwrap_err();
        assert!(matches!(err, Error::Forbidden(msg) if msg.contains("delete")));

        let root = Identity::Superuser {
            user_id: Uuid::new_v4(),
        };
        assert!(check_can_mutate(&root, &target, "delete").is_ok());
    }

    #[test]
    fn orphaned_job_is_not_mutable_by_regular_users() {
        let target = job(STATUS_ACTIVE, None);
        let identity = Identity::Regular {
            user_id: Uuid::new_v4(),
            company: None,
        };
        assert!(check_can_mutate(&identity, &target, "update").is_err());
    }
}
