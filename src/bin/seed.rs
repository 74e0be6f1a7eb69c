use anyhow::Context;
use porto_backend::{
    db::postgres::{create_pool, run_migrations},
    entities::project::ProjectInsert,
    repositories::{project::ProjectRepository, sqlx_repo::SqlxProjectRepo},
    settings::{AppConfig, AppEnvironment},
    telemetry::init_tracing,
};
use validator::Validate;

fn sample_projects() -> Vec<ProjectInsert> {
    vec![
        ProjectInsert {
            title: "E-Commerce Platform Redesign".into(),
            description: "Complete redesign of legacy e-commerce platform with modern UX patterns and improved conversion flow.".into(),
            tags: vec!["UI/UX Design".into(), "React".into(), "Node.js".into()],
            image: vec!["/project-ecommerce.jpg".into()],
            link: Some("https://example.com".into()),
            github: Some("https://github.com/yourrepo/ecommerce".into()),
            year: "2023".into(),
        },
        ProjectInsert {
            title: "Health & Wellness Mobile App".into(),
            description: "End-to-end design and development of a health tracking application with personalized recommendations.".into(),
            tags: vec!["Mobile Design".into(), "Flutter".into(), "Firebase".into()],
            image: vec!["/project-health.jpg".into()],
            link: Some("https://example.com".into()),
            github: Some("https://github.com/yourrepo/healthapp".into()),
            year: "2022".into(),
        },
        ProjectInsert {
            title: "Corporate Design System".into(),
            description: "Created a comprehensive design system for enterprise use across multiple products and platforms.".into(),
            tags: vec!["Design System".into(), "Figma".into(), "Storybook".into()],
            image: vec!["/project-design-system.jpg".into()],
            link: Some("https://example.com".into()),
            github: Some("https://github.com/yourrepo/designsystem".into()),
            year: "2022".into(),
        },
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = AppEnvironment::from_env().unwrap_or(AppEnvironment::Development);
    init_tracing(&env);

    let config = AppConfig::new().context("loading configuration")?;
    let pool = create_pool(&config.database_url)
        .await
        .context("connecting to the database")?;
    run_migrations(&pool).await.context("applying migrations")?;

    let repo = SqlxProjectRepo::new(pool.clone());

    let removed = repo.delete_all_projects().await.map_err(anyhow::Error::msg)?;
    tracing::info!(removed, "Cleared existing projects");

    let mut created = 0;
    for project in sample_projects() {
        project
            .validate()
            .with_context(|| format!("sample project {:?} is invalid", project.title))?;
        let record = repo.create_project(&project).await.map_err(anyhow::Error::msg)?;
        tracing::info!(project_id = record.id, title = %record.title, "Seeded project");
        created += 1;
    }

    tracing::info!(created, "Seeding finished");
    pool.close().await;
    Ok(())
}
