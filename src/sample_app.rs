//! Admin configuration of the sample_app models and the site they live on.

use crate::admin::filters::ListFilter;
use crate::admin::options::{Action, Fieldset, InlineAdmin, ModelAdmin, QueryScope};
use crate::admin::site::{AdminSite, AdminSiteError, AUTH_GROUP_META, AUTH_USER_META};
use crate::admin::{AUTHOR_CLONE_META, AUTHOR_META, CHOICE_META, QUESTION_META};
use crate::app_config::SiteConfig;

pub fn author_admin() -> ModelAdmin {
    ModelAdmin {
        fieldsets: vec![Fieldset::new(
            "Author information",
            vec!["name", "created_date", "updated_date"],
        )],
        list_display: vec!["name", "created_date", "updated_date"],
        search_fields: vec!["name"],
        empty_value_display: "Unknown",
        readonly_fields: vec!["created_date", "updated_date"],
        inlines: vec![InlineAdmin {
            model: &QUESTION_META,
            fk_name: "ref_author",
        }],
        scope: Some(QueryScope::NameStartsWith("j")),
        ..ModelAdmin::new(&AUTHOR_META)
    }
}

pub fn question_admin() -> ModelAdmin {
    ModelAdmin {
        fieldsets: vec![
            Fieldset::new("Question information", vec!["question_text"]),
            Fieldset::new("Date", vec!["pub_date"]),
            Fieldset::new("The author", vec!["ref_author"]).collapsed(),
        ],
        list_display: vec![
            "question_text",
            "go_to_choices",
            "ref_author",
            "has_been_published",
            "pub_date",
            "created_date",
            "updated_date",
        ],
        list_display_links: vec!["ref_author"],
        list_editable: vec!["question_text"],
        date_hierarchy: Some("pub_date"),
        list_filter: vec![
            ListFilter::Published,
            ListFilter::Related {
                title: "ref author",
                parameter_name: "ref_author__id__exact",
            },
        ],
        search_fields: vec!["question_text", "ref_author__name"],
        list_select_related: vec!["ref_author"],
        autocomplete_fields: vec!["ref_author"],
        actions: vec![
            Action::MakePublished,
            Action::ExportToCsv,
            Action::MakePublishedCustom,
        ],
        ..ModelAdmin::new(&QUESTION_META)
    }
}

pub fn choice_admin() -> ModelAdmin {
    ModelAdmin {
        fieldsets: vec![
            Fieldset::new("Choice information", vec!["choice_text"]),
            Fieldset::new("Question", vec!["question"]),
            Fieldset::new("Votes", vec!["votes"]),
        ],
        list_display: vec![
            "question",
            "choice_text",
            "votes",
            "created_date",
            "updated_date",
        ],
        list_display_links: vec!["question"],
        list_filter: vec![ListFilter::Related {
            title: "ref author",
            parameter_name: "question__ref_author__id__exact",
        }],
        search_fields: vec![
            "choice_text",
            "question__ref_author__name",
            "question__question_text",
        ],
        list_select_related: vec!["question", "question__ref_author"],
        ..ModelAdmin::new(&CHOICE_META)
    }
}

pub fn author_clone_admin() -> ModelAdmin {
    ModelAdmin {
        fieldsets: vec![Fieldset::new(
            "Author information",
            vec!["name", "created_date", "updated_date"],
        )],
        list_display: vec!["name", "created_date", "updated_date"],
        search_fields: vec!["name"],
        ..ModelAdmin::new(&AUTHOR_CLONE_META)
    }
}

/// Replaces the stock site: drops the auth models, registers the four
/// sample_app admins and applies the configured titles.
pub fn admin_site(config: &SiteConfig) -> Result<AdminSite, AdminSiteError> {
    let mut site = AdminSite::with_defaults();
    site.name = "sample_app_admin".to_owned();
    site.site_header = config.site_header.clone();
    site.site_title = config.site_title.clone();
    site.index_title = config.index_title.clone();

    site.unregister(&AUTH_USER_META)?;
    site.unregister(&AUTH_GROUP_META)?;

    site.register(author_admin())?;
    site.register(question_admin())?;
    site.register(choice_admin())?;
    site.register(author_clone_admin())?;

    Ok(site)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::ModelKind;

    #[test]
    fn test_site_has_only_sample_models() {
        let site = admin_site(&SiteConfig::default()).unwrap();
        assert!(!site.is_registered(&AUTH_USER_META));
        assert!(!site.is_registered(&AUTH_GROUP_META));
        for kind in ModelKind::ALL {
            assert!(site.is_registered(kind.meta()));
        }
        assert_eq!(site.registered().count(), 4);
        assert_eq!(site.site_header, "My Django Admin Ultimate Guide");
        assert_eq!(
            site.site_title,
            "My Django Admin Ultimate Guide Administration"
        );
        assert_eq!(site.index_title, "Welcome to my \"sample_app\"");
    }

    #[test]
    fn test_question_admin_actions() {
        let names: Vec<&str> = question_admin()
            .available_actions()
            .iter()
            .map(|a| a.name())
            .collect();
        assert_eq!(
            names,
            vec![
                "delete_selected",
                "make_published",
                "export_to_csv",
                "make_published_custom"
            ]
        );
    }

    #[test]
    fn test_question_links_on_author_column() {
        let admin = question_admin();
        assert!(admin.is_link_column("ref_author"));
        assert!(!admin.is_link_column("question_text"));
        assert!(admin.is_editable_in_list("question_text"));
        assert!(admin.uses_autocomplete("ref_author"));
    }

    #[test]
    fn test_author_admin_defaults() {
        let admin = author_admin();
        assert_eq!(admin.empty_value_display, "Unknown");
        assert_eq!(admin.scope, Some(QueryScope::NameStartsWith("j")));
        assert_eq!(admin.available_actions(), vec![Action::DeleteSelected]);
    }
}
