use askama_actix::Template;

const PAGINATOR_LOOK_AHEAD: u64 = 2;

/// Page links around the current page, gaps collapsed:
///
/// [1] 2 3 ... 13
/// 1 ... 4 5 [6] 7 8 ... 13
/// 1 ... 11 12 [13]
#[derive(Debug)]
pub struct Paginator {
    /// Query string of the current view without the page number.
    pub base_query: String,
    pub this_page: u64,
    pub page_count: u64,
}

#[derive(Template)]
#[template(path = "util/paginator.html")]
struct PaginatorTemplate<'a> {
    paginator: &'a Paginator,
}

pub trait PaginatorToHtml {
    fn as_html(&self) -> String;
    fn has_pages(&self) -> bool;
    fn is_current_page(&self, page: &u64) -> bool;
    /// Page numbers to link, `None` where pages are skipped.
    fn get_pages(&self) -> Vec<Option<u64>>;
    fn page_url(&self, page: &u64) -> String;
}

impl PaginatorToHtml for Paginator {
    fn has_pages(&self) -> bool {
        self.page_count > 1
    }

    fn is_current_page(&self, page: &u64) -> bool {
        *page == self.this_page
    }

    fn get_pages(&self) -> Vec<Option<u64>> {
        let low = self.this_page.saturating_sub(PAGINATOR_LOOK_AHEAD).max(1);
        let high = (self.this_page + PAGINATOR_LOOK_AHEAD).min(self.page_count);

        let mut pages = Vec::new();
        if low > 1 {
            pages.push(Some(1));
            if low > 2 {
                pages.push(None);
            }
        }
        pages.extend((low..=high).map(Some));
        if high < self.page_count {
            if high + 1 < self.page_count {
                pages.push(None);
            }
            pages.push(Some(self.page_count));
        }
        pages
    }

    fn page_url(&self, page: &u64) -> String {
        if self.base_query.is_empty() {
            format!("?p={}", page)
        } else {
            format!("?{}&p={}", self.base_query, page)
        }
    }

    fn as_html(&self) -> String {
        if self.has_pages() {
            let mut buffer = String::new();
            let template = PaginatorTemplate { paginator: self };
            if template.render_into(&mut buffer).is_err() {
                "[Paginator Util Error]".to_owned()
            } else {
                buffer
            }
        } else {
            String::new()
        }
    }
}
