//! Default class catalog seeded at first startup

use crate::{
    error::AppResult,
    models::class::Level,
    repository::Repository,
};

/// Specialized classes created when the catalog is empty
pub const DEFAULT_CLASSES: &[(&str, Level, &[&str])] = &[
    (
        "Computer Systems",
        Level::NC,
        &[
            "Computer Architecture",
            "Software Engineering",
            "Embedded Systems",
            "Networking Basics",
            "Hardware Components",
        ],
    ),
    (
        "Computer Systems",
        Level::ND,
        &[
            "Software Engineering",
            "Computer Architecture",
            "Python Programming",
            "Cyber Security",
            "Network Engineering",
            "System Administration",
            "Microprocessor and Embedded Systems",
        ],
    ),
    (
        "Computer Systems",
        Level::HND,
        &[
            "Advanced Software Engineering",
            "Network Security",
            "Database Management Systems",
            "Web Development",
            "Cloud Computing",
            "Mobile Application Development",
        ],
    ),
];

/// Modules shared by every class at a given level
pub fn common_modules(level: Level) -> &'static [&'static str] {
    match level {
        Level::NC => &[
            "Maths",
            "EET",
            "Electronics",
            "Nass",
            "ESD",
            "Communication and Computer Skills",
        ],
        Level::ND => &[
            "ESD",
            "NASS",
            "Draughting and Design",
            "Analogue Electronics",
            "Digital Electronics",
            "EET",
            "Maths",
            "Project",
            "Research and Development",
            "Quality Assurance and Control Systems",
            "Project Management",
        ],
        Level::HND => &[
            "Engineering Mathematics",
            "Research Methods",
            "Project Management",
            "Quality Assurance and Control Systems",
            "Entrepreneurship and Innovation",
        ],
    }
}

/// Union of class-specific and level-common modules, first occurrence wins
pub fn merge_with_common_modules(modules: &[String], level: Level) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(modules.len());
    for module in modules
        .iter()
        .map(String::as_str)
        .chain(common_modules(level).iter().copied())
    {
        if !merged.iter().any(|m| m == module) {
            merged.push(module.to_string());
        }
    }
    merged
}

/// Insert the default classes when the table is empty
pub async fn seed_default_classes(repository: &Repository) -> AppResult<()> {
    if repository.classes.count().await? > 0 {
        return Ok(());
    }

    for (name, level, modules) in DEFAULT_CLASSES {
        let specialized: Vec<String> = modules.iter().map(|m| m.to_string()).collect();
        let merged = merge_with_common_modules(&specialized, *level);
        repository.classes.create(name, *level, &merged).await?;
        tracing::info!(name, level = %level, "Seeded class");
    }

    tracing::info!("Seeded {} default classes", DEFAULT_CLASSES.len());
    Ok(())
}
