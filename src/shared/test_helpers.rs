//! In-memory fakes of the repositories and collaborators, for service and handler tests.
//!
//! `InMemoryStore` implements every repository trait over one mutex-guarded
//! state and mirrors the database constraints the services rely on: unique
//! offers and ratings, the atomic accept, the per-owner posting limit,
//! restricted category deletes and cascading job deletes.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, Router};
use chrono::{DateTime, Duration, Utc};
use fake::faker::address::en::CityName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::repositories::Repositories;
use crate::features::accounts::models::{
    AccountDeletion, DeletionStatus, DeletionStep, PurgedRows,
};
use crate::features::accounts::repositories::AccountDeletionRepository;
use crate::features::auth::clients::{
    IdentityDeletion, IdentityProvider, IdentitySession, IdentityUser, SignUpOutcome,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::categories::models::ServiceCategory;
use crate::features::categories::repositories::CategoryRepository;
use crate::features::homeowners::models::{HomeownerProfile, HomeownerProfileChanges};
use crate::features::homeowners::repositories::HomeownerProfileRepository;
use crate::features::jobs::models::{Job, JobChanges, JobStatus, NewJob};
use crate::features::jobs::repositories::JobRepository;
use crate::features::offers::models::{AcceptedOffer, NewOffer, Offer, OfferStatus};
use crate::features::offers::repositories::OfferRepository;
use crate::features::providers::models::{
    NewProviderProfile, ProviderProfile, ProviderProfileChanges, ProviderSearch,
};
use crate::features::providers::repositories::ProviderProfileRepository;
use crate::features::ratings::models::{NewRating, ProviderRating, RatingStats};
use crate::features::ratings::repositories::RatingRepository;
use crate::features::roles::models::UserRoleRecord;
use crate::features::roles::{Role, UserRoleRepository};
use crate::modules::storage::{ObjectStorage, StorageError};
use crate::shared::validation::slugify;

const SEEDED_CATEGORIES: [&str; 4] = ["Plumbing", "Electrical", "Cleaning", "Painting"];

#[derive(Default)]
struct StoreState {
    roles: HashMap<Uuid, UserRoleRecord>,
    categories: Vec<ServiceCategory>,
    profiles: Vec<ProviderProfile>,
    homeowner_profiles: HashMap<Uuid, HomeownerProfile>,
    jobs: Vec<Job>,
    offers: Vec<Offer>,
    ratings: Vec<ProviderRating>,
    deletions: HashMap<Uuid, AccountDeletion>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl StoreState {
    /// Strictly increasing timestamps so newest-first ordering is deterministic
    fn now(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(next);
        next
    }

    fn category_exists(&self, id: Uuid) -> bool {
        self.categories.iter().any(|c| c.id == id)
    }

    fn job_mut(&mut self, id: Uuid) -> Option<&mut Job> {
        self.jobs.iter_mut().find(|j| j.id == id)
    }

    /// Mirror of `ON DELETE CASCADE` (offers) and `ON DELETE SET NULL` (ratings)
    fn remove_jobs(&mut self, ids: &HashSet<Uuid>) -> u64 {
        let before = self.jobs.len();
        self.jobs.retain(|j| !ids.contains(&j.id));
        self.offers.retain(|o| !ids.contains(&o.job_id));
        for rating in self.ratings.iter_mut() {
            if rating.job_id.is_some_and(|id| ids.contains(&id)) {
                rating.job_id = None;
            }
        }
        (before - self.jobs.len()) as u64
    }
}

fn newest_first<T: Clone>(items: impl Iterator<Item = T>, key: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    let mut items: Vec<T> = items.collect();
    items.sort_by_key(|item| std::cmp::Reverse(key(item)));
    items
}

pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    /// Empty store with a few seeded categories
    pub fn new() -> Arc<Self> {
        let store = Self {
            state: Mutex::new(StoreState::default()),
        };
        {
            let mut state = store.lock();
            for name in SEEDED_CATEGORIES {
                let created_at = state.now();
                state.categories.push(ServiceCategory {
                    id: Uuid::new_v4(),
                    name: name.to_string(),
                    slug: slugify(name),
                    description: None,
                    created_at,
                });
            }
        }
        Arc::new(store)
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap()
    }

    /// Repository handles backed by this store
    pub fn repositories(self: &Arc<Self>) -> Repositories {
        Repositories {
            roles: self.clone(),
            categories: self.clone(),
            providers: self.clone(),
            homeowners: self.clone(),
            jobs: self.clone(),
            offers: self.clone(),
            ratings: self.clone(),
            deletions: self.clone(),
        }
    }

    pub fn category_id(&self, name: &str) -> Uuid {
        self.lock()
            .categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.id)
            .unwrap_or_else(|| panic!("category {} is not seeded", name))
    }

    /// Register a user with a role and return their session
    pub fn add_user(&self, role: Role) -> AuthenticatedUser {
        let user = session(role);
        self.lock().roles.insert(
            user.user_id,
            UserRoleRecord {
                user_id: user.user_id,
                role,
            },
        );
        user
    }

    /// Register a service provider with a profile in `category`
    pub fn add_provider(&self, category: &str) -> AuthenticatedUser {
        let category_id = self.category_id(category);
        let user = self.add_user(Role::ServiceProvider);
        let mut state = self.lock();
        let now = state.now();
        state.profiles.push(ProviderProfile {
            id: Uuid::new_v4(),
            user_id: user.user_id,
            full_name: Name().fake(),
            phone: "555-010-0199".to_string(),
            city: CityName().fake(),
            skill_category_id: category_id,
            bio: None,
            profile_image_url: None,
            created_at: now,
            updated_at: now,
        });
        user
    }

    /// Insert a job directly in any status, bypassing the workflow
    pub fn add_job(
        &self,
        owner: Uuid,
        category: &str,
        status: JobStatus,
        assigned_provider_id: Option<Uuid>,
    ) -> Job {
        let category_id = self.category_id(category);
        let mut state = self.lock();
        let now = state.now();
        let job = Job {
            id: Uuid::new_v4(),
            posted_by: owner,
            title: "Fix leaking kitchen sink".to_string(),
            category_id,
            description: "Water drips from the pipe under the sink all day".to_string(),
            budget: Some("$50-100".to_string()),
            city: "Austin".to_string(),
            date_time: None,
            status,
            assigned_provider_id,
            created_at: now,
            updated_at: now,
        };
        state.jobs.push(job.clone());
        job
    }

    /// Shift an owner's jobs into the past, as if they were posted `by` ago
    pub fn backdate_jobs(&self, owner: Uuid, by: Duration) {
        for job in self.lock().jobs.iter_mut().filter(|j| j.posted_by == owner) {
            job.created_at -= by;
        }
    }

    pub fn job(&self, id: Uuid) -> Option<Job> {
        self.lock().jobs.iter().find(|j| j.id == id).cloned()
    }

    pub fn offers_for_job(&self, job_id: Uuid) -> Vec<Offer> {
        self.lock()
            .offers
            .iter()
            .filter(|o| o.job_id == job_id)
            .cloned()
            .collect()
    }

    pub fn ratings_for_provider(&self, provider_id: Uuid) -> Vec<ProviderRating> {
        self.lock()
            .ratings
            .iter()
            .filter(|r| r.provider_id == provider_id)
            .cloned()
            .collect()
    }

    pub fn role_of(&self, user_id: Uuid) -> Option<Role> {
        self.lock().roles.get(&user_id).map(|r| r.role)
    }

    pub fn profile_of(&self, user_id: Uuid) -> Option<ProviderProfile> {
        self.lock()
            .profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned()
    }

    pub fn homeowner_profile_of(&self, user_id: Uuid) -> Option<HomeownerProfile> {
        self.lock().homeowner_profiles.get(&user_id).cloned()
    }

    pub fn deletion_of(&self, user_id: Uuid) -> Option<AccountDeletion> {
        self.lock().deletions.get(&user_id).cloned()
    }
}

#[async_trait]
impl UserRoleRepository for InMemoryStore {
    async fn find_role(&self, user_id: Uuid) -> Result<Option<Role>> {
        Ok(self.role_of(user_id))
    }

    async fn insert(&self, user_id: Uuid, role: Role) -> Result<UserRoleRecord> {
        let mut state = self.lock();
        if state.roles.contains_key(&user_id) {
            return Err(AppError::Conflict("User already has a role".to_string()));
        }
        let record = UserRoleRecord { user_id, role };
        state.roles.insert(user_id, record.clone());
        Ok(record)
    }

    async fn update_role(&self, user_id: Uuid, role: Role) -> Result<Option<UserRoleRecord>> {
        let mut state = self.lock();
        Ok(state.roles.get_mut(&user_id).map(|record| {
            record.role = role;
            record.clone()
        }))
    }

    async fn delete(&self, user_id: Uuid) -> Result<bool> {
        Ok(self.lock().roles.remove(&user_id).is_some())
    }

    async fn list_all(&self) -> Result<Vec<UserRoleRecord>> {
        Ok(self.lock().roles.values().cloned().collect())
    }

    async fn count_by_role(&self) -> Result<Vec<(Role, i64)>> {
        let state = self.lock();
        let mut counts: Vec<(Role, i64)> = Vec::new();
        for role in [Role::Homeowner, Role::ServiceProvider, Role::Admin] {
            let count = state.roles.values().filter(|r| r.role == role).count() as i64;
            if count > 0 {
                counts.push((role, count));
            }
        }
        Ok(counts)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<ServiceCategory>> {
        let mut categories = self.lock().categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ServiceCategory>> {
        Ok(self.lock().categories.iter().find(|c| c.id == id).cloned())
    }

    async fn insert(
        &self,
        name: &str,
        slug: &str,
        description: Option<&str>,
    ) -> Result<ServiceCategory> {
        let mut state = self.lock();
        let taken = state
            .categories
            .iter()
            .any(|c| c.name.to_lowercase() == name.to_lowercase() || c.slug == slug);
        if taken {
            return Err(AppError::Conflict(
                "A category with this name already exists".to_string(),
            ));
        }
        let category = ServiceCategory {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: slug.to_string(),
            description: description.map(str::to_string),
            created_at: state.now(),
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut state = self.lock();
        let in_use = state.jobs.iter().any(|j| j.category_id == id)
            || state.profiles.iter().any(|p| p.skill_category_id == id);
        if in_use {
            return Err(AppError::Conflict(
                "Category is in use by jobs or provider profiles".to_string(),
            ));
        }
        let before = state.categories.len();
        state.categories.retain(|c| c.id != id);
        Ok(state.categories.len() < before)
    }
}

#[async_trait]
impl ProviderProfileRepository for InMemoryStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<ProviderProfile>> {
        Ok(self.profile_of(user_id))
    }

    async fn find_by_user_ids(&self, user_ids: &[Uuid]) -> Result<Vec<ProviderProfile>> {
        Ok(self
            .lock()
            .profiles
            .iter()
            .filter(|p| user_ids.contains(&p.user_id))
            .cloned()
            .collect())
    }

    async fn insert(&self, profile: NewProviderProfile) -> Result<ProviderProfile> {
        let mut state = self.lock();
        if state.profiles.iter().any(|p| p.user_id == profile.user_id)
            || !state.category_exists(profile.skill_category_id)
        {
            return Err(AppError::Conflict(
                "Provider profile already exists".to_string(),
            ));
        }
        let now = state.now();
        let created = ProviderProfile {
            id: Uuid::new_v4(),
            user_id: profile.user_id,
            full_name: profile.full_name,
            phone: profile.phone,
            city: profile.city,
            skill_category_id: profile.skill_category_id,
            bio: None,
            profile_image_url: None,
            created_at: now,
            updated_at: now,
        };
        state.profiles.push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        user_id: Uuid,
        changes: ProviderProfileChanges,
    ) -> Result<Option<ProviderProfile>> {
        let mut state = self.lock();
        if !state.category_exists(changes.skill_category_id) {
            return Err(AppError::Conflict("Category does not exist".to_string()));
        }
        let now = state.now();
        Ok(state
            .profiles
            .iter_mut()
            .find(|p| p.user_id == user_id)
            .map(|profile| {
                profile.full_name = changes.full_name;
                profile.phone = changes.phone;
                profile.city = changes.city;
                profile.skill_category_id = changes.skill_category_id;
                profile.bio = changes.bio;
                profile.updated_at = now;
                profile.clone()
            }))
    }

    async fn set_profile_image(
        &self,
        user_id: Uuid,
        url: Option<&str>,
    ) -> Result<Option<ProviderProfile>> {
        let mut state = self.lock();
        let now = state.now();
        Ok(state
            .profiles
            .iter_mut()
            .find(|p| p.user_id == user_id)
            .map(|profile| {
                profile.profile_image_url = url.map(str::to_string);
                profile.updated_at = now;
                profile.clone()
            }))
    }

    async fn search(&self, filter: &ProviderSearch) -> Result<Vec<ProviderProfile>> {
        let contains = |haystack: &str, needle: &str| haystack.to_lowercase().contains(needle);
        let city = filter.city.as_deref().map(str::to_lowercase);
        let keyword = filter.keyword.as_deref().map(str::to_lowercase);
        let state = self.lock();
        let category_name = |id: Uuid| {
            state
                .categories
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.name.as_str())
                .unwrap_or_default()
        };
        let mut found: Vec<ProviderProfile> = state
            .profiles
            .iter()
            .filter(|p| filter.category_id.is_none_or(|id| p.skill_category_id == id))
            .filter(|p| city.as_deref().is_none_or(|c| contains(&p.city, c)))
            .filter(|p| {
                keyword.as_deref().is_none_or(|k| {
                    contains(&p.full_name, k)
                        || p.bio.as_deref().is_some_and(|bio| contains(bio, k))
                        || contains(&p.city, k)
                        || contains(category_name(p.skill_category_id), k)
                })
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(found)
    }
}

#[async_trait]
impl HomeownerProfileRepository for InMemoryStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<HomeownerProfile>> {
        Ok(self.homeowner_profile_of(user_id))
    }

    async fn upsert(
        &self,
        user_id: Uuid,
        changes: HomeownerProfileChanges,
    ) -> Result<HomeownerProfile> {
        let mut state = self.lock();
        let now = state.now();
        let profile = state
            .homeowner_profiles
            .entry(user_id)
            .or_insert_with(|| empty_homeowner_profile(user_id, now));
        profile.full_name = changes.full_name;
        profile.phone = changes.phone;
        profile.city = changes.city;
        profile.updated_at = now;
        Ok(profile.clone())
    }

    async fn set_profile_image(
        &self,
        user_id: Uuid,
        url: Option<&str>,
    ) -> Result<HomeownerProfile> {
        let mut state = self.lock();
        let now = state.now();
        let profile = state
            .homeowner_profiles
            .entry(user_id)
            .or_insert_with(|| empty_homeowner_profile(user_id, now));
        profile.profile_image_url = url.map(str::to_string);
        profile.updated_at = now;
        Ok(profile.clone())
    }
}

fn empty_homeowner_profile(user_id: Uuid, now: DateTime<Utc>) -> HomeownerProfile {
    HomeownerProfile {
        user_id,
        full_name: None,
        phone: None,
        city: None,
        profile_image_url: None,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl JobRepository for InMemoryStore {
    async fn insert_rate_limited(
        &self,
        job: NewJob,
        window_start: DateTime<Utc>,
        max_open: i64,
    ) -> Result<Job> {
        let mut state = self.lock();
        let recent_open = state
            .jobs
            .iter()
            .filter(|j| {
                j.posted_by == job.posted_by
                    && j.status == JobStatus::Open
                    && j.created_at >= window_start
            })
            .count() as i64;
        if recent_open >= max_open {
            return Err(AppError::RateLimitExceeded(format!(
                "You can have at most {} open jobs posted within the rate limit window",
                max_open
            )));
        }
        if !state.category_exists(job.category_id) {
            return Err(AppError::Conflict("Category does not exist".to_string()));
        }

        let now = state.now();
        let created = Job {
            id: Uuid::new_v4(),
            posted_by: job.posted_by,
            title: job.title,
            category_id: job.category_id,
            description: job.description,
            budget: job.budget,
            city: job.city,
            date_time: job.date_time,
            status: JobStatus::Open,
            assigned_provider_id: None,
            created_at: now,
            updated_at: now,
        };
        state.jobs.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>> {
        Ok(self.job(id))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Job>> {
        Ok(self
            .lock()
            .jobs
            .iter()
            .filter(|j| ids.contains(&j.id))
            .cloned()
            .collect())
    }

    async fn update_open(&self, id: Uuid, owner: Uuid, changes: JobChanges) -> Result<Option<Job>> {
        let mut state = self.lock();
        if !state.category_exists(changes.category_id) {
            return Err(AppError::Conflict("Category does not exist".to_string()));
        }
        let now = state.now();
        Ok(state
            .job_mut(id)
            .filter(|j| j.posted_by == owner && j.status == JobStatus::Open)
            .map(|job| {
                job.title = changes.title;
                job.category_id = changes.category_id;
                job.description = changes.description;
                job.budget = changes.budget;
                job.city = changes.city;
                job.date_time = changes.date_time;
                job.updated_at = now;
                job.clone()
            }))
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: JobStatus,
        to: JobStatus,
    ) -> Result<Option<Job>> {
        let mut state = self.lock();
        let now = state.now();
        Ok(state.job_mut(id).filter(|j| j.status == from).map(|job| {
            job.status = to;
            job.updated_at = now;
            job.clone()
        }))
    }

    async fn delete_in_status(&self, id: Uuid, allowed: &[JobStatus]) -> Result<bool> {
        let mut state = self.lock();
        let deletable = state
            .jobs
            .iter()
            .any(|j| j.id == id && allowed.contains(&j.status));
        if !deletable {
            return Ok(false);
        }
        Ok(state.remove_jobs(&HashSet::from([id])) > 0)
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Job>> {
        let state = self.lock();
        Ok(newest_first(
            state.jobs.iter().filter(|j| j.posted_by == owner).cloned(),
            |j| j.created_at,
        ))
    }

    async fn list_open_in_category(
        &self,
        category_id: Uuid,
        exclude_owner: Uuid,
    ) -> Result<Vec<Job>> {
        let state = self.lock();
        Ok(newest_first(
            state
                .jobs
                .iter()
                .filter(|j| {
                    j.status == JobStatus::Open
                        && j.category_id == category_id
                        && j.posted_by != exclude_owner
                })
                .cloned(),
            |j| j.created_at,
        ))
    }

    async fn list_active_for_provider(&self, provider_id: Uuid) -> Result<Vec<Job>> {
        let state = self.lock();
        Ok(newest_first(
            state
                .jobs
                .iter()
                .filter(|j| j.assigned_provider_id == Some(provider_id) && j.status.is_active_work())
                .cloned(),
            |j| j.updated_at,
        ))
    }

    async fn list_page(&self, offset: i64, limit: i64) -> Result<(Vec<Job>, i64)> {
        let state = self.lock();
        let all = newest_first(state.jobs.iter().cloned(), |j| j.created_at);
        let total = all.len() as i64;
        let page = all
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn count_by_status(&self) -> Result<Vec<(JobStatus, i64)>> {
        let state = self.lock();
        Ok(JobStatus::ALL
            .iter()
            .map(|status| {
                let count = state.jobs.iter().filter(|j| j.status == *status).count() as i64;
                (*status, count)
            })
            .filter(|(_, count)| *count > 0)
            .collect())
    }
}

#[async_trait]
impl OfferRepository for InMemoryStore {
    async fn insert_for_open_job(&self, offer: NewOffer) -> Result<Option<Offer>> {
        let mut state = self.lock();
        let job_accepts_offer = state.jobs.iter().any(|j| {
            j.id == offer.job_id && j.status == JobStatus::Open && j.posted_by != offer.provider_id
        });
        if !job_accepts_offer {
            return Ok(None);
        }
        if state
            .offers
            .iter()
            .any(|o| o.job_id == offer.job_id && o.provider_id == offer.provider_id)
        {
            return Err(AppError::Conflict(
                "You have already submitted an offer for this job".to_string(),
            ));
        }

        let now = state.now();
        let created = Offer {
            id: Uuid::new_v4(),
            job_id: offer.job_id,
            provider_id: offer.provider_id,
            message: offer.message,
            proposed_rate: offer.proposed_rate,
            status: OfferStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        state.offers.push(created.clone());
        Ok(Some(created))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Offer>> {
        Ok(self.lock().offers.iter().find(|o| o.id == id).cloned())
    }

    async fn list_by_job(&self, job_id: Uuid) -> Result<Vec<Offer>> {
        Ok(newest_first(self.offers_for_job(job_id).into_iter(), |o| {
            o.created_at
        }))
    }

    async fn list_by_provider(&self, provider_id: Uuid) -> Result<Vec<Offer>> {
        let state = self.lock();
        Ok(newest_first(
            state
                .offers
                .iter()
                .filter(|o| o.provider_id == provider_id)
                .cloned(),
            |o| o.created_at,
        ))
    }

    async fn accept(&self, offer_id: Uuid) -> Result<AcceptedOffer> {
        let mut state = self.lock();
        let offer = state
            .offers
            .iter()
            .find(|o| o.id == offer_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Offer '{}' not found", offer_id)))?;

        if offer.status != OfferStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Offer is already {}",
                offer.status
            )));
        }

        let now = state.now();
        let job = state
            .job_mut(offer.job_id)
            .filter(|j| j.status == JobStatus::Open)
            .map(|job| {
                job.status = JobStatus::Assigned;
                job.assigned_provider_id = Some(offer.provider_id);
                job.updated_at = now;
                job.clone()
            })
            .ok_or_else(|| AppError::Conflict("Job is no longer open for offers".to_string()))?;

        let mut accepted = None;
        let mut rejected_offer_ids = Vec::new();
        for sibling in state.offers.iter_mut().filter(|o| o.job_id == offer.job_id) {
            if sibling.id == offer_id {
                sibling.status = OfferStatus::Accepted;
                sibling.updated_at = now;
                accepted = Some(sibling.clone());
            } else if sibling.status == OfferStatus::Pending {
                sibling.status = OfferStatus::Rejected;
                sibling.updated_at = now;
                rejected_offer_ids.push(sibling.id);
            }
        }

        Ok(AcceptedOffer {
            job,
            offer: accepted.unwrap_or(offer),
            rejected_offer_ids,
        })
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.lock().offers.len() as i64)
    }
}

#[async_trait]
impl RatingRepository for InMemoryStore {
    async fn insert(&self, rating: NewRating) -> Result<ProviderRating> {
        let mut state = self.lock();
        let duplicate = state
            .ratings
            .iter()
            .any(|r| r.job_id == Some(rating.job_id));
        if duplicate || state.job_mut(rating.job_id).is_none() {
            return Err(AppError::Conflict("Job has already been rated".to_string()));
        }
        let created = ProviderRating {
            id: Uuid::new_v4(),
            homeowner_id: rating.homeowner_id,
            provider_id: rating.provider_id,
            job_id: Some(rating.job_id),
            rating: rating.rating,
            review: rating.review,
            created_at: state.now(),
        };
        state.ratings.push(created.clone());
        Ok(created)
    }

    async fn list_by_provider(&self, provider_id: Uuid) -> Result<Vec<ProviderRating>> {
        Ok(newest_first(
            self.ratings_for_provider(provider_id).into_iter(),
            |r| r.created_at,
        ))
    }

    async fn stats_for_providers(&self, provider_ids: &[Uuid]) -> Result<Vec<RatingStats>> {
        let state = self.lock();
        let mut scores: HashMap<Uuid, Vec<i16>> = HashMap::new();
        for rating in state
            .ratings
            .iter()
            .filter(|r| provider_ids.contains(&r.provider_id))
        {
            scores.entry(rating.provider_id).or_default().push(rating.rating);
        }
        Ok(scores
            .into_iter()
            .map(|(provider_id, scores)| {
                let total: i64 = scores.iter().map(|s| i64::from(*s)).sum();
                RatingStats {
                    provider_id,
                    average: total as f64 / scores.len() as f64,
                    count: scores.len() as i64,
                }
            })
            .collect())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.lock().ratings.len() as i64)
    }
}

#[async_trait]
impl AccountDeletionRepository for InMemoryStore {
    async fn find(&self, user_id: Uuid) -> Result<Option<AccountDeletion>> {
        Ok(self.deletion_of(user_id))
    }

    async fn begin(&self, user_id: Uuid, role: Option<Role>) -> Result<AccountDeletion> {
        Ok(self
            .lock()
            .deletions
            .entry(user_id)
            .or_insert_with(|| AccountDeletion {
                user_id,
                role,
                step: DeletionStep::RemoveProfileImages,
                status: DeletionStatus::InProgress,
                attempts: 0,
                last_error: None,
            })
            .clone())
    }

    async fn advance(
        &self,
        user_id: Uuid,
        from: DeletionStep,
        to: DeletionStep,
    ) -> Result<Option<AccountDeletion>> {
        Ok(self
            .lock()
            .deletions
            .get_mut(&user_id)
            .filter(|d| d.step == from && d.status == DeletionStatus::InProgress)
            .map(|deletion| {
                deletion.step = to;
                deletion.last_error = None;
                deletion.clone()
            }))
    }

    async fn record_failure(&self, user_id: Uuid, error: &str) -> Result<()> {
        if let Some(deletion) = self.lock().deletions.get_mut(&user_id) {
            deletion.attempts += 1;
            deletion.last_error = Some(error.to_string());
        }
        Ok(())
    }

    async fn complete(&self, user_id: Uuid) -> Result<AccountDeletion> {
        let mut state = self.lock();
        let deletion = state
            .deletions
            .get_mut(&user_id)
            .ok_or_else(|| AppError::Internal(format!("No deletion for {}", user_id)))?;
        deletion.step = DeletionStep::Done;
        deletion.status = DeletionStatus::Completed;
        deletion.last_error = None;
        Ok(deletion.clone())
    }

    async fn purge_provider_data(&self, user_id: Uuid) -> Result<PurgedRows> {
        let mut state = self.lock();
        let (profiles, offers, ratings) =
            (state.profiles.len(), state.offers.len(), state.ratings.len());
        state.profiles.retain(|p| p.user_id != user_id);
        let homeowner_profile = state.homeowner_profiles.remove(&user_id).is_some();
        state.offers.retain(|o| o.provider_id != user_id);
        state.ratings.retain(|r| r.provider_id != user_id);
        Ok(PurgedRows {
            profiles: (profiles - state.profiles.len()) as u64 + u64::from(homeowner_profile),
            jobs: 0,
            offers: (offers - state.offers.len()) as u64,
            ratings: (ratings - state.ratings.len()) as u64,
        })
    }

    async fn purge_homeowner_data(&self, user_id: Uuid) -> Result<PurgedRows> {
        let mut state = self.lock();
        let ratings = state.ratings.len();
        state.ratings.retain(|r| r.homeowner_id != user_id);
        let ratings = (ratings - state.ratings.len()) as u64;

        let job_ids: HashSet<Uuid> = state
            .jobs
            .iter()
            .filter(|j| j.posted_by == user_id)
            .map(|j| j.id)
            .collect();
        let jobs = state.remove_jobs(&job_ids);
        let profiles = u64::from(state.homeowner_profiles.remove(&user_id).is_some());

        Ok(PurgedRows {
            profiles,
            jobs,
            offers: 0,
            ratings,
        })
    }
}

/// Identity service fake: accounts keyed by email, tokens are opaque strings
#[derive(Default)]
pub struct FakeIdentityProvider {
    accounts: Mutex<HashMap<String, (IdentityUser, String)>>,
    deleted: Mutex<Vec<Uuid>>,
    signed_out: Mutex<Vec<String>>,
    fail_deletes: AtomicBool,
    require_confirmation: AtomicBool,
}

impl FakeIdentityProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make `admin_delete_user` fail until switched back
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Answer sign-ups without a session, like an auth service with email
    /// confirmation on; a repeated sign-up then returns the existing user
    pub fn require_confirmation(&self, required: bool) {
        self.require_confirmation.store(required, Ordering::SeqCst);
    }

    /// Create an account directly, as if it had signed up earlier
    pub fn register(&self, user_id: Uuid, email: &str, password: &str) {
        self.accounts.lock().unwrap().insert(
            email.to_string(),
            (identity_user(user_id, email), password.to_string()),
        );
    }

    pub fn deleted_ids(&self) -> Vec<Uuid> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn signed_out_tokens(&self) -> Vec<String> {
        self.signed_out.lock().unwrap().clone()
    }

    pub fn password_of(&self, email: &str) -> Option<String> {
        self.accounts
            .lock()
            .unwrap()
            .get(email)
            .map(|(_, password)| password.clone())
    }

    fn session_for(user: &IdentityUser) -> IdentitySession {
        IdentitySession {
            access_token: format!("access-{}", user.id),
            token_type: "bearer".to_string(),
            expires_in: 3600,
            refresh_token: format!("refresh-{}", user.id),
            user: user.clone(),
        }
    }
}

fn identity_user(id: Uuid, email: &str) -> IdentityUser {
    IdentityUser {
        id,
        email: Some(email.to_string()),
        created_at: Some(Utc::now()),
        last_sign_in_at: None,
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        _metadata: serde_json::Value,
    ) -> Result<SignUpOutcome> {
        let pending = self.require_confirmation.load(Ordering::SeqCst);
        let mut accounts = self.accounts.lock().unwrap();
        if let Some((existing, _)) = accounts.get(email) {
            if pending {
                return Ok(SignUpOutcome::PendingConfirmation(existing.clone()));
            }
            return Err(AppError::Conflict("User already registered".to_string()));
        }
        let user = identity_user(Uuid::new_v4(), email);
        accounts.insert(email.to_string(), (user.clone(), password.to_string()));
        Ok(if pending {
            SignUpOutcome::PendingConfirmation(user)
        } else {
            SignUpOutcome::Session(Self::session_for(&user))
        })
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<IdentitySession> {
        match self.accounts.lock().unwrap().get(email) {
            Some((user, stored)) if stored == password => Ok(Self::session_for(user)),
            _ => Err(AppError::Unauthorized(
                "Invalid login credentials".to_string(),
            )),
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<IdentitySession> {
        self.accounts
            .lock()
            .unwrap()
            .values()
            .find(|(user, _)| format!("refresh-{}", user.id) == refresh_token)
            .map(|(user, _)| Self::session_for(user))
            .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".to_string()))
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        self.signed_out.lock().unwrap().push(access_token.to_string());
        Ok(())
    }

    async fn update_password(&self, access_token: &str, new_password: &str) -> Result<()> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .values_mut()
            .find(|(user, _)| format!("access-{}", user.id) == access_token)
            .ok_or_else(|| AppError::Unauthorized("Invalid session".to_string()))?;
        account.1 = new_password.to_string();
        Ok(())
    }

    async fn admin_list_users(&self) -> Result<Vec<IdentityUser>> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .map(|(user, _)| user.clone())
            .collect())
    }

    async fn admin_get_user(&self, user_id: Uuid) -> Result<Option<IdentityUser>> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .find(|(user, _)| user.id == user_id)
            .map(|(user, _)| user.clone()))
    }

    async fn admin_delete_user(&self, user_id: Uuid) -> Result<IdentityDeletion> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::ExternalServiceError(
                "Auth service unavailable".to_string(),
            ));
        }
        let mut accounts = self.accounts.lock().unwrap();
        let before = accounts.len();
        accounts.retain(|_, (user, _)| user.id != user_id);
        self.deleted.lock().unwrap().push(user_id);
        Ok(if accounts.len() < before {
            IdentityDeletion::Deleted
        } else {
            IdentityDeletion::NotFound
        })
    }
}

/// Object storage fake keyed by logical key
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<BTreeMap<String, (Vec<u8>, String)>>,
    fail_lists: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn content_type_of(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(_, content_type)| content_type.clone())
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> std::result::Result<(), StorageError> {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (data, content_type.to_string()));
        Ok(())
    }

    async fn list(&self, prefix: &str) -> std::result::Result<Vec<String>, StorageError> {
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(StorageError::Request("storage offline".to_string()));
        }
        Ok(self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn delete(&self, key: &str) -> std::result::Result<(), StorageError> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("http://storage.test/genie-uploads/public/{}", key)
    }
}

/// Session for a fresh user id; not registered in any store
pub fn session(role: Role) -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: Uuid::new_v4(),
        email: Some(SafeEmail().fake()),
        role: Some(role),
        access_token: "test-access-token".to_string(),
    }
}

/// Attach `user` as the authenticated caller of every request to `router`
pub fn with_user(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
        },
    ))
}
