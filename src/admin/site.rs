//! Admin site: the registry of models and their admin options.

use super::options::ModelAdmin;
use super::{FieldDef, FieldKind, ModelMeta};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminSiteError {
    AlreadyRegistered(String),
    NotRegistered(String),
}

impl fmt::Display for AdminSiteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminSiteError::AlreadyRegistered(model) => {
                write!(f, "The model {} is already registered", model)
            }
            AdminSiteError::NotRegistered(model) => {
                write!(f, "The model {} is not registered", model)
            }
        }
    }
}

impl std::error::Error for AdminSiteError {}

pub static AUTH_USER_META: ModelMeta = ModelMeta {
    app_label: "auth",
    model_name: "user",
    verbose_name: "user",
    verbose_name_plural: "users",
    fields: &[
        FieldDef {
            name: "id",
            verbose_name: "ID",
            kind: FieldKind::AutoPk,
        },
        FieldDef {
            name: "username",
            verbose_name: "username",
            kind: FieldKind::Char { max_length: 150 },
        },
    ],
};

pub static AUTH_GROUP_META: ModelMeta = ModelMeta {
    app_label: "auth",
    model_name: "group",
    verbose_name: "group",
    verbose_name_plural: "groups",
    fields: &[
        FieldDef {
            name: "id",
            verbose_name: "ID",
            kind: FieldKind::AutoPk,
        },
        FieldDef {
            name: "name",
            verbose_name: "name",
            kind: FieldKind::Char { max_length: 150 },
        },
    ],
};

/// One row of the index page.
#[derive(Debug, Clone)]
pub struct AppModelEntry {
    pub name: &'static str,
    pub changelist_url: String,
    pub add_url: String,
}

/// Index page grouping of registered models by app.
#[derive(Debug, Clone)]
pub struct AppEntry {
    pub app_label: &'static str,
    pub models: Vec<AppModelEntry>,
}

fn model_key(meta: &ModelMeta) -> String {
    format!("{}.{}", meta.app_label, meta.model_name)
}

#[derive(Debug, Clone)]
pub struct AdminSite {
    pub name: String,
    pub site_header: String,
    pub site_title: String,
    pub index_title: String,
    registry: Vec<ModelAdmin>,
}

impl AdminSite {
    /// An empty site with the stock titles.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            site_header: "Administration".to_owned(),
            site_title: "Site admin".to_owned(),
            index_title: "Site administration".to_owned(),
            registry: Vec::new(),
        }
    }

    /// The stock site, with the built-in user and group models registered.
    pub fn with_defaults() -> Self {
        let mut site = Self::new("admin");
        site.registry.push(ModelAdmin::new(&AUTH_USER_META));
        site.registry.push(ModelAdmin::new(&AUTH_GROUP_META));
        site
    }

    pub fn register(&mut self, admin: ModelAdmin) -> Result<(), AdminSiteError> {
        if self.is_registered(admin.meta) {
            return Err(AdminSiteError::AlreadyRegistered(model_key(admin.meta)));
        }
        log::debug!("Registered {} on admin site '{}'", model_key(admin.meta), self.name);
        self.registry.push(admin);
        Ok(())
    }

    pub fn unregister(&mut self, meta: &ModelMeta) -> Result<(), AdminSiteError> {
        let before = self.registry.len();
        self.registry.retain(|admin| admin.meta != meta);
        if self.registry.len() == before {
            return Err(AdminSiteError::NotRegistered(model_key(meta)));
        }
        Ok(())
    }

    pub fn is_registered(&self, meta: &ModelMeta) -> bool {
        self.registry.iter().any(|admin| admin.meta == meta)
    }

    pub fn get(&self, app_label: &str, model_name: &str) -> Option<&ModelAdmin> {
        self.registry
            .iter()
            .find(|admin| admin.meta.app_label == app_label && admin.meta.model_name == model_name)
    }

    pub fn registered(&self) -> impl Iterator<Item = &ModelAdmin> {
        self.registry.iter()
    }

    /// Registered models grouped by app, apps and models sorted by name.
    pub fn app_list(&self) -> Vec<AppEntry> {
        let mut admins: Vec<&ModelAdmin> = self.registry.iter().collect();
        admins.sort_by_key(|a| (a.meta.app_label, a.meta.verbose_name_plural));

        let mut apps: Vec<AppEntry> = Vec::new();
        for admin in admins {
            let entry = AppModelEntry {
                name: admin.meta.verbose_name_plural,
                changelist_url: admin.meta.changelist_url(),
                add_url: admin.meta.add_url(),
            };
            match apps.last_mut() {
                Some(app) if app.app_label == admin.meta.app_label => app.models.push(entry),
                _ => apps.push(AppEntry {
                    app_label: admin.meta.app_label,
                    models: vec![entry],
                }),
            }
        }
        apps
    }
}
