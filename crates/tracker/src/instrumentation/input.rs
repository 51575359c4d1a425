use super::PageInstrumentation;
use crate::category::Category;
use crate::error::{TrackError, report};
use crate::notify::NotificationSink;
use dom::PageDom;
use log::info;

impl<D: PageDom, S: NotificationSink> PageInstrumentation<D, S> {
    /// Type `text` into the text input `id` and optionally submit its form.
    ///
    /// Returns false when the input is unknown, or when a submit was asked
    /// for and could not happen. The text itself is still written in the
    /// latter case.
    pub fn set_text_input(&mut self, id: u32, text: &str, submit: bool) -> bool {
        let Some(proxy) = self.tracked[Category::TextInput].get_mut(id) else {
            report(&TrackError::UnknownId {
                registry: Category::TextInput.label(),
                id,
            });
            return false;
        };
        match proxy.set_text_input(text, submit, &mut self.host.scope()) {
            Ok(()) => {
                if submit {
                    info!("submitted form for text input {id}");
                }
                true
            }
            Err(err) => {
                report(&err);
                false
            }
        }
    }
}
