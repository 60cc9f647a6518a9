//! SurrealDB implementation of [`UserRepository`].
//!
//! The repository stores already-hashed passwords; hashing lives in
//! `conectar-auth`. Deleting a user removes their services and every
//! opinion they wrote or received in one transaction.

use chrono::{DateTime, Utc};
use conectar_core::error::{MarketError, MarketResult};
use conectar_core::models::user::{
    Counter, CreateUser, FreelancerFilter, MAX_SKILLS, Plan, Role, UpdateUser, User, VisitRecord,
};
use conectar_core::repository::UserRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, info};
use uuid::Uuid;

use super::{CountRow, id_strings, parse_uuid, parse_uuids, record_exists, violates_index};
use crate::error::DbError;

const EMAIL_TAKEN: &str = "El email ya está en uso";

#[derive(Debug, SurrealValue)]
struct VisitRow {
    ip: String,
    last_visit: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRow {
    record_id: String,
    first_name: String,
    last_name: String,
    email: String,
    password_hash: String,
    role: String,
    plan: String,
    linkedin: Option<String>,
    portfolio: Option<String>,
    description: Option<String>,
    rate: Option<f64>,
    is_available: bool,
    skills: Vec<String>,
    visit_count: u64,
    linkedin_access_count: u64,
    portfolio_access_count: u64,
    visit_history: Vec<VisitRow>,
    opinion_ids: Vec<String>,
    service_ids: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_role(s: &str) -> Result<Role, DbError> {
    match s {
        "Client" => Ok(Role::Client),
        "Freelancer" => Ok(Role::Freelancer),
        other => Err(DbError::Decode(format!("unknown role: {other}"))),
    }
}

fn role_to_string(r: Role) -> &'static str {
    match r {
        Role::Client => "Client",
        Role::Freelancer => "Freelancer",
    }
}

fn parse_plan(s: &str) -> Result<Plan, DbError> {
    match s {
        "Free" => Ok(Plan::Free),
        "Premium" => Ok(Plan::Premium),
        other => Err(DbError::Decode(format!("unknown plan: {other}"))),
    }
}

fn plan_to_string(p: Plan) -> &'static str {
    match p {
        Plan::Free => "Free",
        Plan::Premium => "Premium",
    }
}

fn counter_field(counter: Counter) -> &'static str {
    match counter {
        Counter::LinkedinAccess => "linkedin_access_count",
        Counter::PortfolioAccess => "portfolio_access_count",
    }
}

impl UserRow {
    fn try_into_user(self) -> Result<User, DbError> {
        Ok(User {
            id: parse_uuid(&self.record_id)?,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password_hash: self.password_hash,
            role: parse_role(&self.role)?,
            plan: parse_plan(&self.plan)?,
            linkedin: self.linkedin,
            portfolio: self.portfolio,
            description: self.description,
            rate: self.rate,
            is_available: self.is_available,
            skills: self.skills,
            visit_count: self.visit_count,
            linkedin_access_count: self.linkedin_access_count,
            portfolio_access_count: self.portfolio_access_count,
            visit_history: self
                .visit_history
                .into_iter()
                .map(|v| VisitRecord {
                    ip: v.ip,
                    last_visit: v.last_visit,
                })
                .collect(),
            opinion_ids: parse_uuids(&self.opinion_ids)?,
            service_ids: parse_uuids(&self.service_ids)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn into_users(rows: Vec<UserRow>) -> Result<Vec<User>, DbError> {
    rows.into_iter().map(UserRow::try_into_user).collect()
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn ensure_exists(&self, id: Uuid) -> Result<(), DbError> {
        if record_exists(&self.db, "user", id).await? {
            Ok(())
        } else {
            Err(DbError::not_found("user", id))
        }
    }

    /// Whether `email` belongs to a user other than `except`.
    async fn email_taken(&self, email: &str, except: Option<Uuid>) -> Result<bool, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM user \
                 WHERE email = $email AND meta::id(id) != $except GROUP ALL",
            )
            .bind(("email", email.to_string()))
            .bind(("except", except.map(|id| id.to_string()).unwrap_or_default()))
            .await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }

    /// Classify a failed write of `email`. Losing a race on the unique
    /// email index is reported like the pre-check would have.
    async fn email_conflict(
        &self,
        message: String,
        email: &str,
        except: Option<Uuid>,
    ) -> MarketError {
        let taken = violates_index(&message, "idx_user_email")
            || self.email_taken(email, except).await.unwrap_or(false);
        if taken {
            MarketError::already_exists("user", EMAIL_TAKEN)
        } else {
            DbError::Query(message).into()
        }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> MarketResult<User> {
        if self.email_taken(&input.email, None).await? {
            return Err(MarketError::already_exists("user", EMAIL_TAKEN));
        }

        let id = Uuid::new_v4();

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 first_name = $first_name, last_name = $last_name, \
                 email = $email, password_hash = $password_hash, \
                 role = $role, plan = 'Free'",
            )
            .bind(("id", id.to_string()))
            .bind(("first_name", input.first_name.trim().to_string()))
            .bind(("last_name", input.last_name.trim().to_string()))
            .bind(("email", input.email.clone()))
            .bind(("password_hash", input.password_hash))
            .bind(("role", role_to_string(input.role).to_string()))
            .await
            .map_err(DbError::from)?;

        if let Err(e) = result.check() {
            return Err(self.email_conflict(e.to_string(), &input.email, None).await);
        }

        info!(user_id = %id, role = ?input.role, "User created");
        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> MarketResult<User> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('user', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("user", id))?;

        Ok(row.try_into_user()?)
    }

    async fn get_by_email(&self, email: &str) -> MarketResult<User> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM user WHERE email = $email")
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("user", format!("email={email}")))?;

        Ok(row.try_into_user()?)
    }

    async fn email_exists(&self, email: &str) -> MarketResult<bool> {
        Ok(self.email_taken(email, None).await?)
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> MarketResult<User> {
        self.ensure_exists(id).await?;

        if let Some(email) = input.email.as_deref() {
            if self.email_taken(email, Some(id)).await? {
                return Err(MarketError::already_exists("user", EMAIL_TAKEN));
            }
        }

        let mut sets = Vec::new();
        if input.first_name.is_some() {
            sets.push("first_name = $first_name");
        }
        if input.last_name.is_some() {
            sets.push("last_name = $last_name");
        }
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.password_hash.is_some() {
            sets.push("password_hash = $password_hash");
        }
        if input.role.is_some() {
            sets.push("role = $role");
        }
        if input.plan.is_some() {
            sets.push("plan = $plan");
        }
        if input.linkedin.is_some() {
            sets.push("linkedin = $linkedin");
        }
        if input.portfolio.is_some() {
            sets.push("portfolio = $portfolio");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.rate.is_some() {
            sets.push("rate = $rate");
        }
        if input.is_available.is_some() {
            sets.push("is_available = $is_available");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('user', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id.to_string()));

        if let Some(first_name) = input.first_name {
            builder = builder.bind(("first_name", first_name.trim().to_string()));
        }
        if let Some(last_name) = input.last_name {
            builder = builder.bind(("last_name", last_name.trim().to_string()));
        }
        let new_email = input.email.clone();
        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(password_hash) = input.password_hash {
            builder = builder.bind(("password_hash", password_hash));
        }
        if let Some(role) = input.role {
            builder = builder.bind(("role", role_to_string(role).to_string()));
        }
        if let Some(plan) = input.plan {
            builder = builder.bind(("plan", plan_to_string(plan).to_string()));
        }
        if let Some(linkedin) = input.linkedin {
            builder = builder.bind(("linkedin", linkedin.trim().to_string()));
        }
        if let Some(portfolio) = input.portfolio {
            builder = builder.bind(("portfolio", portfolio.trim().to_string()));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description.trim().to_string()));
        }
        if let Some(rate) = input.rate {
            builder = builder.bind(("rate", rate));
        }
        if let Some(is_available) = input.is_available {
            builder = builder.bind(("is_available", is_available));
        }

        let result = builder.await.map_err(DbError::from)?;
        if let Err(e) = result.check() {
            return Err(match new_email {
                Some(email) => self.email_conflict(e.to_string(), &email, Some(id)).await,
                None => DbError::Query(e.to_string()).into(),
            });
        }

        self.get_by_id(id).await
    }

    async fn delete(&self, id: Uuid) -> MarketResult<()> {
        self.ensure_exists(id).await?;

        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 LET $authored = (SELECT VALUE meta::id(id) FROM opinion WHERE author_id = $id); \
                 UPDATE user SET opinion_ids = array::complement(opinion_ids, $authored) \
                     WHERE opinion_ids CONTAINSANY $authored; \
                 DELETE opinion WHERE author_id = $id OR recipient_id = $id; \
                 DELETE service WHERE freelancer_id = $id; \
                 DELETE type::record('user', $id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(user_id = %id, "User deleted");
        Ok(())
    }

    async fn list(&self) -> MarketResult<Vec<User>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM user ORDER BY created_at ASC")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        Ok(into_users(rows)?)
    }

    async fn list_freelancers(&self, filter: FreelancerFilter) -> MarketResult<Vec<User>> {
        let mut conditions = vec!["role = 'Freelancer'"];
        if filter.premium_only {
            conditions.push("plan = 'Premium'");
        }
        if filter.available_only {
            conditions.push("is_available = true");
        }
        if filter.ids.is_some() {
            conditions.push("meta::id(id) IN $ids");
        }

        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM user WHERE {} \
             ORDER BY created_at ASC",
            conditions.join(" AND ")
        );

        let mut builder = self.db.query(&query);
        if let Some(ids) = filter.ids {
            builder = builder.bind(("ids", id_strings(&ids)));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        Ok(into_users(rows)?)
    }

    async fn set_skills(&self, id: Uuid, skills: Vec<String>) -> MarketResult<User> {
        if skills.len() > MAX_SKILLS {
            return Err(MarketError::validation(format!(
                "El perfil solo puede tener un máximo de {MAX_SKILLS} skills, \
                 pero se intentó guardar {}.",
                skills.len()
            )));
        }
        self.ensure_exists(id).await?;

        let result = self
            .db
            .query(
                "UPDATE type::record('user', $id) SET \
                 skills = $skills, updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .bind(("skills", skills))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        self.get_by_id(id).await
    }

    async fn save_visits(
        &self,
        id: Uuid,
        history: Vec<VisitRecord>,
        visit_count: u64,
    ) -> MarketResult<User> {
        self.ensure_exists(id).await?;

        let history: Vec<VisitRow> = history
            .into_iter()
            .map(|v| VisitRow {
                ip: v.ip,
                last_visit: v.last_visit,
            })
            .collect();

        let result = self
            .db
            .query(
                "UPDATE type::record('user', $id) SET \
                 visit_history = $history, visit_count = $visit_count",
            )
            .bind(("id", id.to_string()))
            .bind(("history", history))
            .bind(("visit_count", visit_count))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        debug!(user_id = %id, visit_count, "Visit history saved");
        self.get_by_id(id).await
    }

    async fn increment_counter(&self, id: Uuid, counter: Counter) -> MarketResult<User> {
        self.ensure_exists(id).await?;

        let query = format!(
            "UPDATE type::record('user', $id) SET {} += 1",
            counter_field(counter)
        );
        let result = self
            .db
            .query(&query)
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        self.get_by_id(id).await
    }
}
