//! Dashboard and freelancer directory over real SurrealDB repositories.

use conectar_core::dashboard::{Dashboard, DashboardService};
use conectar_core::listing::DirectoryService;
use conectar_core::models::opinion::CreateOpinion;
use conectar_core::models::service::CreateService;
use conectar_core::models::service_type::CreateServiceType;
use conectar_core::models::user::{CreateUser, FreelancerFilter, Plan, Role, UpdateUser, User};
use conectar_core::repository::{
    OpinionRepository, ServiceRepository, ServiceTypeRepository, UserRepository,
};
use conectar_db::repository::{
    SurrealOpinionRepository, SurrealServiceRepository, SurrealServiceTypeRepository,
    SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

struct Repos {
    users: SurrealUserRepository<Db>,
    opinions: SurrealOpinionRepository<Db>,
    services: SurrealServiceRepository<Db>,
    types: SurrealServiceTypeRepository<Db>,
}

async fn setup() -> Repos {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    conectar_db::run_migrations(&db).await.unwrap();
    Repos {
        users: SurrealUserRepository::new(db.clone()),
        opinions: SurrealOpinionRepository::new(db.clone()),
        services: SurrealServiceRepository::new(db.clone()),
        types: SurrealServiceTypeRepository::new(db),
    }
}

async fn user(r: &Repos, email: &str, role: Role, plan: Plan) -> User {
    let u = r
        .users
        .create(CreateUser {
            first_name: "Nombre".into(),
            last_name: "Apellido".into(),
            email: email.into(),
            password_hash: "hash".into(),
            role,
        })
        .await
        .unwrap();
    r.users
        .update(
            u.id,
            UpdateUser {
                plan: Some(plan),
                ..Default::default()
            },
        )
        .await
        .unwrap()
}

async fn rate(r: &Repos, author: &User, recipient: &User, score: i64) {
    r.opinions
        .create(CreateOpinion {
            recipient_id: recipient.id,
            author_id: author.id,
            score,
            body: format!("puntaje {score}"),
        })
        .await
        .unwrap();
}

fn dashboards(r: &Repos) -> DashboardService<
    SurrealUserRepository<Db>,
    SurrealOpinionRepository<Db>,
    SurrealServiceRepository<Db>,
> {
    DashboardService::new(r.users.clone(), r.opinions.clone(), r.services.clone())
}

fn directory(r: &Repos) -> DirectoryService<
    SurrealUserRepository<Db>,
    SurrealOpinionRepository<Db>,
    SurrealServiceRepository<Db>,
    SurrealServiceTypeRepository<Db>,
> {
    DirectoryService::new(
        r.users.clone(),
        r.opinions.clone(),
        r.services.clone(),
        r.types.clone(),
    )
}

#[tokio::test]
async fn dashboard_branches_by_role_and_plan() {
    let r = setup().await;
    let client = user(&r, "c@example.com", Role::Client, Plan::Free).await;
    let free = user(&r, "f@example.com", Role::Freelancer, Plan::Free).await;
    let premium = user(&r, "p@example.com", Role::Freelancer, Plan::Premium).await;

    for score in [5, 5, 3, 1, 5] {
        rate(&r, &client, &premium, score).await;
    }
    rate(&r, &client, &free, 4).await;

    let svc = dashboards(&r);

    let Dashboard::Client(c) = svc.dashboard(client.id).await.unwrap() else {
        panic!("expected client dashboard");
    };
    assert_eq!(c.estadisticas.total_opiniones_realizadas, 6);
    assert_eq!(c.estadisticas.ultimas_opiniones.len(), 5);

    let Dashboard::Freelancer(f) = svc.dashboard(free.id).await.unwrap() else {
        panic!("expected freelancer dashboard");
    };
    assert_eq!(f.estadisticas.total_opiniones_recibidas, 1);
    assert_eq!(f.estadisticas.promedio_calificacion, 4.0);

    let Dashboard::Premium(p) = svc.dashboard(premium.id).await.unwrap() else {
        panic!("expected premium dashboard");
    };
    assert_eq!(p.estadisticas.base.promedio_calificacion, 3.8);
    assert_eq!(p.estadisticas.distribucion_calificaciones.get(5), 3);
    assert_eq!(p.estadisticas.distribucion_calificaciones.get(2), 0);
    assert_eq!(p.estadisticas.tasa_conversion.total, 0.0);
}

#[tokio::test]
async fn dashboard_for_missing_user_is_not_found() {
    let r = setup().await;
    let err = dashboards(&r)
        .dashboard(uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        conectar_core::error::MarketError::NotFound { .. }
    ));
}

#[tokio::test]
async fn premium_directory_is_ranked_by_rating() {
    let r = setup().await;
    let client = user(&r, "c@example.com", Role::Client, Plan::Free).await;
    let low = user(&r, "low@example.com", Role::Freelancer, Plan::Premium).await;
    let high = user(&r, "high@example.com", Role::Freelancer, Plan::Premium).await;
    let unrated = user(&r, "none@example.com", Role::Freelancer, Plan::Premium).await;
    let free = user(&r, "free@example.com", Role::Freelancer, Plan::Free).await;

    rate(&r, &client, &low, 2).await;
    rate(&r, &client, &high, 5).await;
    rate(&r, &client, &high, 4).await;
    rate(&r, &client, &free, 5).await;

    let ranked = directory(&r).premium_freelancers().await.unwrap();
    let ids: Vec<_> = ranked.iter().map(|f| f.profile.id).collect();
    assert_eq!(ids, vec![high.id, low.id, unrated.id]);
    assert_eq!(ranked[0].rating, "4.5");
    assert_eq!(ranked[2].calculated_rating, 0.0);
}

#[tokio::test]
async fn category_search_ignores_case() {
    let r = setup().await;
    let web = r
        .types
        .create(CreateServiceType {
            name: "Tienda Online".into(),
            category: "E-commerce".into(),
            main_category: "Desarrollo Web".into(),
            base_description: None,
        })
        .await
        .unwrap();
    let design = r
        .types
        .create(CreateServiceType {
            name: "Logo".into(),
            category: "Branding".into(),
            main_category: "Diseño".into(),
            base_description: None,
        })
        .await
        .unwrap();

    let dev = user(&r, "dev@example.com", Role::Freelancer, Plan::Free).await;
    let artist = user(&r, "art@example.com", Role::Freelancer, Plan::Free).await;
    for (who, ty) in [(&dev, &web), (&artist, &design)] {
        r.services
            .create(CreateService {
                freelancer_id: who.id,
                service_type_id: ty.id,
                price: 10.0,
                description: "servicio".into(),
                estimated_duration: None,
            })
            .await
            .unwrap();
    }

    let dir = directory(&r);
    let found = dir.by_main_category("DESARROLLO WEB").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].profile.id, dev.id);
    assert_eq!(found[0].servicios[0].service_type.name, "Tienda Online");

    let found = dir.by_category("branding").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].profile.id, artist.id);

    assert!(dir.by_category("inexistente").await.unwrap().is_empty());

    let everyone = dir.freelancers(FreelancerFilter::default()).await.unwrap();
    assert_eq!(everyone.len(), 2);
    assert!(everyone.iter().all(|f| f.average_rating == 0.0));
}
