//! In-memory HTML page whose placeholder elements are filled with fragments.
//!
//! Placeholders follow the page convention: the element receiving content is
//! found by `id`, and it sits inside (or is) a `.content-file-preview`
//! container carrying the click-to-edit affordances. Binding happens in two
//! lol_html passes over the page: the first locates the enclosing container
//! by its document-order ordinal, the second rewrites the target and settles
//! that container.

use std::{
    cell::{Cell, RefCell},
    path::Path,
    rc::Rc,
};

use lol_html::{
    RewriteStrSettings, Selector, element,
    html_content::{ContentType, Element, EndTag},
    rewrite_str,
};
use tracing::debug;

use crate::{
    application::ports::{BindError, BoundContent, TargetBinder},
    domain::fragments::{FragmentId, TargetId},
};

use super::error::InfraError;

const CONTAINER_SELECTOR: &str = ".content-file-preview";
const EDIT_NOTICE_SELECTOR: &str = ".edit-notice";
const TITLE_PREFIX: &str = "Content loaded from ";
const CONTENT_DIR: &str = "content/";

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDocument {
    html: String,
}

impl PageDocument {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub async fn load(path: &Path) -> Result<Self, InfraError> {
        let html = tokio::fs::read_to_string(path).await?;
        Ok(Self::new(html))
    }

    pub async fn write_to(&self, path: &Path) -> Result<(), InfraError> {
        tokio::fs::write(path, self.html.as_bytes()).await?;
        Ok(())
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn into_html(self) -> String {
        self.html
    }

    /// Ordinal of the container enclosing the first element with `target`
    /// as its id.
    fn locate(&self, target: &TargetId) -> Result<usize, BindError> {
        let selector = target_selector(target)?;
        let seen = Rc::new(Cell::new(0usize));
        let open = Rc::new(RefCell::new(Vec::new()));
        let located: Rc<RefCell<Option<Option<usize>>>> = Rc::new(RefCell::new(None));

        rewrite_str(
            &self.html,
            RewriteStrSettings {
                element_content_handlers: vec![
                    element!(CONTAINER_SELECTOR, {
                        let seen = Rc::clone(&seen);
                        let open = Rc::clone(&open);
                        move |el| {
                            let ordinal = seen.get();
                            seen.set(ordinal + 1);
                            track_container(el, &open, ordinal);
                            Ok(())
                        }
                    }),
                    element!(selector.as_str(), {
                        let open = Rc::clone(&open);
                        let located = Rc::clone(&located);
                        move |_el| {
                            let mut located = located.borrow_mut();
                            if located.is_none() {
                                *located = Some(open.borrow().last().copied());
                            }
                            Ok(())
                        }
                    }),
                ],
                ..RewriteStrSettings::default()
            },
        )
        .map_err(|err| BindError::Rewrite {
            message: err.to_string(),
        })?;

        let located = located.borrow_mut().take();
        match located {
            None => Err(BindError::MissingTarget {
                target: target.clone(),
            }),
            Some(None) => Err(BindError::MissingContainer {
                target: target.clone(),
            }),
            Some(Some(ordinal)) => Ok(ordinal),
        }
    }

    fn apply(
        &self,
        fragment: &FragmentId,
        target: &TargetId,
        container: usize,
        content: BoundContent,
    ) -> Result<String, BindError> {
        let selector = target_selector(target)?;
        // Only a container settled around an empty fragment keeps the
        // content directory in its title.
        let container_title = match &content {
            BoundContent::Html(_) => format!("{TITLE_PREFIX}{fragment}"),
            BoundContent::Plain => format!("{TITLE_PREFIX}{CONTENT_DIR}{fragment}"),
        };
        let target_title = format!("{TITLE_PREFIX}{fragment}");
        let seen = Rc::new(Cell::new(0usize));
        let open = Rc::new(RefCell::new(Vec::new()));
        let notice_hidden = Rc::new(Cell::new(false));
        let target_done = Rc::new(Cell::new(false));

        rewrite_str(
            &self.html,
            RewriteStrSettings {
                element_content_handlers: vec![
                    element!(CONTAINER_SELECTOR, {
                        let seen = Rc::clone(&seen);
                        let open = Rc::clone(&open);
                        move |el| {
                            let ordinal = seen.get();
                            seen.set(ordinal + 1);
                            track_container(el, &open, ordinal);
                            if ordinal == container {
                                settle(el, &container_title)?;
                            }
                            Ok(())
                        }
                    }),
                    element!(EDIT_NOTICE_SELECTOR, {
                        let open = Rc::clone(&open);
                        let notice_hidden = Rc::clone(&notice_hidden);
                        move |el| {
                            if !notice_hidden.get() && open.borrow().contains(&container) {
                                notice_hidden.set(true);
                                set_style_property(el, "display", "none")?;
                            }
                            Ok(())
                        }
                    }),
                    element!(selector.as_str(), {
                        let target_done = Rc::clone(&target_done);
                        move |el| {
                            if target_done.replace(true) {
                                return Ok(());
                            }
                            match &content {
                                BoundContent::Html(html) => {
                                    el.set_inner_content(html, ContentType::Html);
                                }
                                BoundContent::Plain => settle(el, &target_title)?,
                            }
                            Ok(())
                        }
                    }),
                ],
                ..RewriteStrSettings::default()
            },
        )
        .map_err(|err| BindError::Rewrite {
            message: err.to_string(),
        })
    }
}

impl TargetBinder for PageDocument {
    fn bind(
        &mut self,
        fragment: &FragmentId,
        target: &TargetId,
        content: BoundContent,
    ) -> Result<(), BindError> {
        let container = self.locate(target)?;
        self.html = self.apply(fragment, target, container, content)?;
        debug!(
            target: "hydrator::page",
            fragment = %fragment,
            element = %target,
            container,
            "fragment bound into page"
        );
        Ok(())
    }
}

fn target_selector(target: &TargetId) -> Result<String, BindError> {
    let id = target.as_str();
    if id.is_empty() || id.contains(['"', '\\']) {
        return Err(BindError::MissingTarget {
            target: target.clone(),
        });
    }
    let selector = format!("[id=\"{id}\"]");
    selector
        .parse::<Selector>()
        .map_err(|_| BindError::MissingTarget {
            target: target.clone(),
        })?;
    Ok(selector)
}

/// Keep `open` as the stack of containers enclosing the current position.
fn track_container(el: &mut Element<'_, '_>, open: &Rc<RefCell<Vec<usize>>>, ordinal: usize) {
    let Some(handlers) = el.end_tag_handlers() else {
        // Void element: cannot enclose anything.
        return;
    };
    open.borrow_mut().push(ordinal);
    let open = Rc::clone(open);
    handlers.push(Box::new(move |_end: &mut EndTag<'_>| {
        open.borrow_mut().pop();
        Ok(())
    }));
}

/// Drop the click-to-edit affordances and describe where the content came
/// from.
fn settle(el: &mut Element<'_, '_>, title: &str) -> HandlerResult {
    el.remove_attribute("onclick");
    set_style_property(el, "cursor", "default")?;
    el.set_attribute("title", title)?;
    Ok(())
}

fn set_style_property(el: &mut Element<'_, '_>, property: &str, value: &str) -> HandlerResult {
    let style = merge_style(el.get_attribute("style").as_deref(), property, value);
    el.set_attribute("style", &style)?;
    Ok(())
}

/// Replace `property` in an inline style declaration list, keeping the rest.
fn merge_style(existing: Option<&str>, property: &str, value: &str) -> String {
    let mut declarations: Vec<String> = existing
        .unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|declaration| !declaration.is_empty())
        .filter(|declaration| {
            declaration
                .split_once(':')
                .is_none_or(|(name, _)| !name.trim().eq_ignore_ascii_case(property))
        })
        .map(str::to_string)
        .collect();
    declarations.push(format!("{property}: {value}"));
    declarations.join("; ")
}
