//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Every method that writes more
//! than one record (opinion and service back-references) must do so as
//! a single logical unit.

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::error::MarketResult;
use crate::models::{
    opinion::{CreateOpinion, Opinion},
    service::{CreateService, Service, ServiceWithType, UpdateService},
    service_type::{CreateServiceType, ServiceType},
    technology::Technology,
    user::{Counter, CreateUser, FreelancerFilter, UpdateUser, User, VisitRecord},
};

// ---------------------------------------------------------------------------
// Identity store
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    /// Fails with `AlreadyExists` if the email is taken.
    fn create(&self, input: CreateUser) -> impl Future<Output = MarketResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = MarketResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = MarketResult<User>> + Send;
    fn email_exists(&self, email: &str) -> impl Future<Output = MarketResult<bool>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = MarketResult<User>> + Send;
    /// Hard delete, together with the user's services and opinions.
    fn delete(&self, id: Uuid) -> impl Future<Output = MarketResult<()>> + Send;
    fn list(&self) -> impl Future<Output = MarketResult<Vec<User>>> + Send;
    fn list_freelancers(
        &self,
        filter: FreelancerFilter,
    ) -> impl Future<Output = MarketResult<Vec<User>>> + Send;

    /// Replace the skill list. Fails with `Validation` above `MAX_SKILLS`.
    fn set_skills(
        &self,
        id: Uuid,
        skills: Vec<String>,
    ) -> impl Future<Output = MarketResult<User>> + Send;

    /// Persist the result of a visit-dedup decision.
    fn save_visits(
        &self,
        id: Uuid,
        history: Vec<VisitRecord>,
        visit_count: u64,
    ) -> impl Future<Output = MarketResult<User>> + Send;

    /// Atomically add one to a click counter.
    fn increment_counter(
        &self,
        id: Uuid,
        counter: Counter,
    ) -> impl Future<Output = MarketResult<User>> + Send;
}

// ---------------------------------------------------------------------------
// Opinion store
// ---------------------------------------------------------------------------

pub trait OpinionRepository: Send + Sync {
    /// Create the opinion and append it to the recipient's opinion list.
    ///
    /// Self-reviews fail with `Validation` before anything is written.
    fn create(&self, input: CreateOpinion) -> impl Future<Output = MarketResult<Opinion>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = MarketResult<Opinion>> + Send;

    /// Opinions received by a user, most recent first.
    fn list_received(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = MarketResult<Vec<Opinion>>> + Send;

    /// Opinions written by a user, most recent first.
    fn list_authored(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = MarketResult<Vec<Opinion>>> + Send;

    /// Opinions received by any of the given users.
    fn list_for_recipients(
        &self,
        user_ids: &[Uuid],
    ) -> impl Future<Output = MarketResult<Vec<Opinion>>> + Send;

    /// Delete the opinion and remove it from the recipient's list.
    fn delete(&self, id: Uuid) -> impl Future<Output = MarketResult<Opinion>> + Send;
}

// ---------------------------------------------------------------------------
// Service catalog store
// ---------------------------------------------------------------------------

pub trait ServiceRepository: Send + Sync {
    /// Fails with `AlreadyExists` if the freelancer already offers the type.
    fn create(&self, input: CreateService) -> impl Future<Output = MarketResult<Service>> + Send;

    /// Update a service owned by `owner_id`; `NotFound` otherwise.
    fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        input: UpdateService,
    ) -> impl Future<Output = MarketResult<ServiceWithType>> + Send;

    /// Delete a service owned by `owner_id`; `NotFound` otherwise.
    fn delete(
        &self,
        id: Uuid,
        owner_id: Uuid,
    ) -> impl Future<Output = MarketResult<Service>> + Send;

    fn list_by_freelancer(
        &self,
        freelancer_id: Uuid,
    ) -> impl Future<Output = MarketResult<Vec<ServiceWithType>>> + Send;

    fn list_by_freelancers(
        &self,
        freelancer_ids: &[Uuid],
    ) -> impl Future<Output = MarketResult<Vec<ServiceWithType>>> + Send;

    /// Distinct freelancers offering any of the given types.
    fn freelancer_ids_for_types(
        &self,
        type_ids: &[Uuid],
    ) -> impl Future<Output = MarketResult<Vec<Uuid>>> + Send;
}

pub trait ServiceTypeRepository: Send + Sync {
    fn create(
        &self,
        input: CreateServiceType,
    ) -> impl Future<Output = MarketResult<ServiceType>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = MarketResult<ServiceType>> + Send;

    /// Whole catalog, sorted by name.
    fn list_all(&self) -> impl Future<Output = MarketResult<Vec<ServiceType>>> + Send;

    /// Exact match on main category, sorted by name.
    fn list_by_main_category(
        &self,
        main_category: &str,
    ) -> impl Future<Output = MarketResult<Vec<ServiceType>>> + Send;

    /// Exact match on category, sorted by name.
    fn list_by_category(
        &self,
        category: &str,
    ) -> impl Future<Output = MarketResult<Vec<ServiceType>>> + Send;

    fn distinct_main_categories(
        &self,
    ) -> impl Future<Output = MarketResult<BTreeSet<String>>> + Send;

    /// Case-insensitive match on main category.
    fn find_by_main_category_ci(
        &self,
        main_category: &str,
    ) -> impl Future<Output = MarketResult<Vec<ServiceType>>> + Send;

    /// Case-insensitive match on category.
    fn find_by_category_ci(
        &self,
        category: &str,
    ) -> impl Future<Output = MarketResult<Vec<ServiceType>>> + Send;
}

pub trait TechnologyRepository: Send + Sync {
    /// Stores the name uppercase. Fails with `AlreadyExists` on duplicates.
    fn create(&self, name: &str) -> impl Future<Output = MarketResult<Technology>> + Send;

    /// All names, sorted.
    fn list_names(&self) -> impl Future<Output = MarketResult<Vec<String>>> + Send;
}
