//! Pages of recommended courses.
//!
//! The `recommendations` slot holds the batch that starts at the page shown last. Showing the
//! next page drops that page from the front and stores the rest.

use kic_core::{
    ActionError, ActionResponses, BotMessage, Button, CollectingDispatcher, Recommendation,
    SessionStore, RECOMMENDATIONS_SLOT,
};
use serde_json::Value;

pub const PAGE_SIZE: usize = 3;

/// One page to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub shown: Vec<Recommendation>,
    /// Size of the batch this page starts.
    pub total: usize,
    /// Courses left after this page.
    pub remaining: usize,
}

/// Recommendations still to page through, front first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendationBatch {
    items: Vec<Recommendation>,
}

impl RecommendationBatch {
    pub fn new(items: Vec<Recommendation>) -> Self {
        Self { items }
    }

    /// Reads the stored batch; absent or unreadable values read as empty.
    pub fn load(store: &dyn SessionStore) -> Self {
        match store.get(RECOMMENDATIONS_SLOT) {
            None | Some(Value::Null) => Self::default(),
            Some(value) => match serde_json::from_value::<Vec<Recommendation>>(value) {
                Ok(items) => Self::new(items),
                Err(e) => {
                    tracing::warn!(
                        target: "kic::actions",
                        error = %e,
                        "Stored recommendations unreadable"
                    );
                    Self::default()
                }
            },
        }
    }

    pub fn save(&self, store: &dyn SessionStore) -> Result<(), ActionError> {
        store.set(RECOMMENDATIONS_SLOT, serde_json::to_value(&self.items)?);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The first page of this batch.
    pub fn first_page(&self) -> Page {
        let shown: Vec<Recommendation> = self.items.iter().take(PAGE_SIZE).cloned().collect();
        Page {
            total: self.items.len(),
            remaining: self.items.len() - shown.len(),
            shown,
        }
    }

    /// Drops the page shown last. `None` when nothing follows it.
    pub fn next_page(&self) -> Option<(Page, RecommendationBatch)> {
        if self.items.len() <= PAGE_SIZE {
            return None;
        }
        let rest = RecommendationBatch::new(self.items[PAGE_SIZE..].to_vec());
        Some((rest.first_page(), rest))
    }
}

/// Response ids used to render a page.
#[derive(Debug, Clone, Copy)]
pub struct PageTemplates {
    pub header: &'static str,
    pub header_single: &'static str,
    /// `{0}` title, `{1}` course code.
    pub item: &'static str,
    /// `{0}` title, `{1}` URL-encoded title.
    pub item_search: &'static str,
    pub more_single: &'static str,
    pub more_multiple: &'static str,
}

impl PageTemplates {
    pub fn keys(&self) -> [&'static str; 6] {
        [
            self.header,
            self.header_single,
            self.item,
            self.item_search,
            self.more_single,
            self.more_multiple,
        ]
    }
}

/// Button title for one course.
pub fn course_title(
    course: &Recommendation,
    responses: &ActionResponses,
    templates: &PageTemplates,
) -> String {
    match course.code() {
        Some(code) => responses.format(templates.item, &[&course.name, &code]),
        None => responses.format(
            templates.item_search,
            &[&course.name, &urlencoding::encode(&course.name)],
        ),
    }
}

/// Header, one button per course (payload is the course title) and the remaining count.
pub fn render_page(
    page: &Page,
    responses: &ActionResponses,
    templates: &PageTemplates,
    dispatcher: &mut CollectingDispatcher,
) {
    let header = if page.total == 1 {
        templates.header_single
    } else {
        templates.header
    };
    dispatcher.utter_text(responses.format(header, &[&page.total]));

    let buttons = page
        .shown
        .iter()
        .map(|course| {
            Button::new(
                course_title(course, responses, templates),
                course.name.clone(),
            )
        })
        .collect();
    dispatcher.utter_message(BotMessage::buttons(buttons));

    if page.remaining > 0 {
        let more = if page.remaining == 1 {
            templates.more_single
        } else {
            templates.more_multiple
        };
        dispatcher.utter_text(responses.format(more, &[&page.remaining]));
    }
}
