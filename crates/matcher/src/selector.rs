use descry_mapping::ElementRecord;

/// Attributes usable in a constructed CSS selector, in priority order.
const SELECTOR_ATTRIBUTES: [&str; 5] = ["type", "role", "name", "placeholder", "aria-label"];

/// Tags whose visible text is a reasonable locator.
const TEXT_TAGS: [&str; 9] = ["button", "a", "label", "h1", "h2", "h3", "h4", "h5", "h6"];

/// Turns a matched record into the most refactor-resistant selector it
/// supports: test id, id, vetted selector, attributes or text, then xpath.
pub struct SelectorSynthesizer {
    text_max_len: usize,
}

impl Default for SelectorSynthesizer {
    fn default() -> Self {
        Self { text_max_len: 30 }
    }
}

impl SelectorSynthesizer {
    pub fn new(text_max_len: usize) -> Self {
        Self { text_max_len }
    }

    /// Never fails: every record has an xpath to fall back on.
    ///
    /// Ids that are not plain CSS identifiers (leading digit, dots, colons)
    /// are emitted as `[id="…"]` rather than `#…`, which would not parse.
    pub fn synthesize(&self, element: &ElementRecord) -> String {
        if let Some(test_id) = element.test_id() {
            return format!("[data-testid=\"{}\"]", escape(test_id));
        }

        if let Some(id) = element.element_id() {
            return if is_css_identifier(id) {
                format!("#{}", id)
            } else {
                format!("[id=\"{}\"]", escape(id))
            };
        }

        if let Some(first) = element
            .alternative_selectors
            .as_deref()
            .and_then(|selectors| selectors.iter().map(|s| s.trim()).find(|s| !s.is_empty()))
        {
            return if first.starts_with('/') {
                format!("xpath={}", first)
            } else {
                first.to_string()
            };
        }

        if let Some(selector) = self.text_selector(element) {
            return selector;
        }

        if let Some(selector) = attribute_selector(element) {
            return selector;
        }

        format!("xpath={}", element.xpath)
    }

    fn text_selector(&self, element: &ElementRecord) -> Option<String> {
        if !TEXT_TAGS.contains(&element.tag_name.as_str()) {
            return None;
        }
        let text = element.text()?.split_whitespace().collect::<Vec<_>>().join(" ");
        if text.chars().count() >= self.text_max_len {
            return None;
        }
        Some(format!("{}:text(\"{}\")", element.tag_name, escape(&text)))
    }
}

fn attribute_selector(element: &ElementRecord) -> Option<String> {
    let clauses: String = SELECTOR_ATTRIBUTES
        .iter()
        .filter_map(|name| {
            element
                .attribute(name)
                .map(|value| format!("[{}=\"{}\"]", name, escape(value)))
        })
        .collect();

    if clauses.is_empty() {
        None
    } else {
        Some(format!("{}{}", element.tag_name, clauses))
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Conservative check for ids usable after `#` without escaping.
fn is_css_identifier(id: &str) -> bool {
    let starts_ok = match id.as_bytes() {
        [first, ..] if first.is_ascii_alphabetic() || *first == b'_' => true,
        [b'-', second, ..] => second.is_ascii_alphabetic() || *second == b'_',
        _ => false,
    };
    starts_ok && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(tag: &str) -> ElementRecord {
        ElementRecord {
            tag_name: tag.into(),
            xpath: format!("/html/body/{}[1]", tag),
            ..Default::default()
        }
    }

    fn with_attr(mut element: ElementRecord, name: &str, value: &str) -> ElementRecord {
        element.attributes.insert(name.into(), value.into());
        element
    }

    #[test]
    fn test_id_beats_everything() {
        let mut element = with_attr(base("input"), "data-testid", "login-username");
        element.id = Some("username".into());
        element.alternative_selectors = Some(vec!["input.user".into()]);
        assert_eq!(SelectorSynthesizer::default().synthesize(&element), "[data-testid=\"login-username\"]");
    }

    #[test]
    fn id_comes_second() {
        let mut element = base("input");
        element.id = Some("email".into());
        assert_eq!(SelectorSynthesizer::default().synthesize(&element), "#email");

        element.id = Some("1st.field".into());
        assert_eq!(SelectorSynthesizer::default().synthesize(&element), "[id=\"1st.field\"]");
    }

    #[test]
    fn vetted_selectors_keep_their_order() {
        let mut element = base("div");
        element.alternative_selectors = Some(vec!["//div[@class='card']".into(), ".card".into()]);
        assert_eq!(SelectorSynthesizer::default().synthesize(&element), "xpath=//div[@class='card']");

        element.alternative_selectors = Some(vec![".card".into()]);
        assert_eq!(SelectorSynthesizer::default().synthesize(&element), ".card");
    }

    #[test]
    fn short_button_text_becomes_text_selector() {
        let mut element = base("button");
        element.inner_text = Some("Submit".into());
        element = with_attr(element, "type", "submit");
        assert_eq!(SelectorSynthesizer::default().synthesize(&element), "button:text(\"Submit\")");
    }

    #[test]
    fn long_text_falls_back_to_attributes() {
        let mut element = with_attr(base("button"), "type", "submit");
        element.inner_text = Some("Continue to the payment details page".into());
        assert_eq!(SelectorSynthesizer::default().synthesize(&element), "button[type=\"submit\"]");
    }

    #[test]
    fn attributes_follow_fixed_order() {
        let element = with_attr(
            with_attr(with_attr(base("input"), "placeholder", "Search \"all\""), "type", "search"),
            "name",
            "q",
        );
        assert_eq!(
            SelectorSynthesizer::default().synthesize(&element),
            "input[type=\"search\"][name=\"q\"][placeholder=\"Search \\\"all\\\"\"]"
        );
    }

    #[test]
    fn xpath_is_the_last_resort() {
        let mut element = base("div");
        element.inner_text = Some("Welcome".into());
        assert_eq!(SelectorSynthesizer::default().synthesize(&element), "xpath=/html/body/div[1]");
    }
}
