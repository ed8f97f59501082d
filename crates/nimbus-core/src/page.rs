//! The renderable page tree.
//!
//! `Page` is the common currency between the client router and the
//! server renderer: route components and layouts produce a `Page`,
//! and either environment decides what to do with it (string
//! rendering on the server, mounting in the browser runtime).

/// A renderable tree of HTML content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
	/// Renders to nothing.
	Empty,
	/// Text content, HTML-escaped on render.
	Text(String),
	/// Pre-rendered markup, emitted verbatim.
	Raw(String),
	/// An element with a tag, attributes and children.
	Element(PageElement),
	/// A sequence of sibling nodes.
	Fragment(Vec<Page>),
}

impl Page {
	/// Creates a text node.
	pub fn text(content: impl Into<String>) -> Self {
		Self::Text(content.into())
	}

	/// Creates a raw markup node. The content is emitted without
	/// escaping; callers are responsible for its safety.
	pub fn raw(content: impl Into<String>) -> Self {
		Self::Raw(content.into())
	}

	/// Renders the tree to an HTML string.
	pub fn render_to_string(&self) -> String {
		let mut out = String::new();
		self.render_into(&mut out);
		out
	}

	fn render_into(&self, out: &mut String) {
		match self {
			Self::Empty => {}
			Self::Text(text) => out.push_str(&escape_html(text)),
			Self::Raw(markup) => out.push_str(markup),
			Self::Element(element) => element.render_into(out),
			Self::Fragment(children) => {
				for child in children {
					child.render_into(out);
				}
			}
		}
	}

	/// Returns true if the tree renders to an empty string.
	pub fn is_empty(&self) -> bool {
		match self {
			Self::Empty => true,
			Self::Text(text) | Self::Raw(text) => text.is_empty(),
			Self::Element(_) => false,
			Self::Fragment(children) => children.iter().all(Page::is_empty),
		}
	}
}

impl From<PageElement> for Page {
	fn from(element: PageElement) -> Self {
		Self::Element(element)
	}
}

impl From<&str> for Page {
	fn from(text: &str) -> Self {
		Self::Text(text.to_string())
	}
}

impl From<String> for Page {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}

/// An HTML element node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageElement {
	tag: String,
	attrs: Vec<(String, String)>,
	children: Vec<Page>,
}

/// Void elements never render a closing tag.
const VOID_ELEMENTS: &[&str] = &[
	"area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
	"wbr",
];

impl PageElement {
	/// Creates an element with the given tag.
	pub fn new(tag: impl Into<String>) -> Self {
		Self {
			tag: tag.into(),
			attrs: Vec::new(),
			children: Vec::new(),
		}
	}

	/// Adds an attribute. Values are escaped on render.
	pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.attrs.push((name.into(), value.into()));
		self
	}

	/// Appends a child node.
	pub fn child(mut self, child: impl Into<Page>) -> Self {
		self.children.push(child.into());
		self
	}

	/// Appends several child nodes.
	pub fn children(mut self, children: impl IntoIterator<Item = Page>) -> Self {
		self.children.extend(children);
		self
	}

	/// Returns the element's tag name.
	pub fn tag(&self) -> &str {
		&self.tag
	}

	fn render_into(&self, out: &mut String) {
		out.push('<');
		out.push_str(&self.tag);
		for (name, value) in &self.attrs {
			out.push(' ');
			out.push_str(name);
			out.push_str("=\"");
			out.push_str(&escape_html(value));
			out.push('"');
		}
		out.push('>');

		if VOID_ELEMENTS.contains(&self.tag.as_str()) {
			return;
		}

		for child in &self.children {
			child.render_into(out);
		}
		out.push_str("</");
		out.push_str(&self.tag);
		out.push('>');
	}
}

/// Converts a value into a renderable page.
pub trait IntoPage {
	/// Consumes the value and produces a page tree.
	fn into_page(self) -> Page;
}

impl IntoPage for Page {
	fn into_page(self) -> Page {
		self
	}
}

impl IntoPage for PageElement {
	fn into_page(self) -> Page {
		Page::Element(self)
	}
}

impl IntoPage for String {
	fn into_page(self) -> Page {
		Page::Text(self)
	}
}

/// A statically known component with a render method.
pub trait Component {
	/// Produces the component's page tree.
	fn render(&self) -> Page;

	/// The component's name, used in diagnostics and hydration markers.
	fn name() -> &'static str
	where
		Self: Sized,
	{
		std::any::type_name::<Self>()
	}
}

/// Escapes text for safe interpolation into HTML content or
/// double-quoted attribute values.
pub fn escape_html(s: &str) -> String {
	s.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
		.replace('"', "&quot;")
		.replace('\'', "&#x27;")
}

/// Escapes JSON for safe embedding inside a `<script>` tag.
///
/// HTML parsers do not understand JavaScript string context: a literal
/// `</script>` inside the payload would terminate the tag early and
/// allow markup injection. Rewriting `</` to `<\/` is transparent to
/// JSON parsers and JavaScript while defusing the closing sequence.
pub fn escape_json_for_script(json: &str) -> String {
	json.replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_empty_renders_nothing() {
		assert_eq!(Page::Empty.render_to_string(), "");
		assert!(Page::Empty.is_empty());
	}

	#[test]
	fn test_text_is_escaped() {
		let page = Page::text("<b>&\"bold\"</b>");
		assert_eq!(
			page.render_to_string(),
			"&lt;b&gt;&amp;&quot;bold&quot;&lt;/b&gt;"
		);
	}

	#[test]
	fn test_raw_is_verbatim() {
		let page = Page::raw("<b>bold</b>");
		assert_eq!(page.render_to_string(), "<b>bold</b>");
	}

	#[test]
	fn test_element_with_attrs_and_children() {
		let page = PageElement::new("div")
			.attr("class", "card")
			.child(Page::text("hello"))
			.into_page();
		assert_eq!(page.render_to_string(), "<div class=\"card\">hello</div>");
	}

	#[test]
	fn test_attr_value_escaped() {
		let page = PageElement::new("div")
			.attr("title", "a \"b\" <c>")
			.into_page();
		assert_eq!(
			page.render_to_string(),
			"<div title=\"a &quot;b&quot; &lt;c&gt;\"></div>"
		);
	}

	#[test]
	fn test_void_element_has_no_closing_tag() {
		let page = PageElement::new("br").into_page();
		assert_eq!(page.render_to_string(), "<br>");
	}

	#[test]
	fn test_fragment_concatenates() {
		let page = Page::Fragment(vec![
			PageElement::new("h1").child("title").into_page(),
			PageElement::new("p").child("body").into_page(),
		]);
		assert_eq!(page.render_to_string(), "<h1>title</h1><p>body</p>");
	}

	#[test]
	fn test_nested_fragment_is_empty() {
		let page = Page::Fragment(vec![Page::Empty, Page::Fragment(vec![Page::Empty])]);
		assert!(page.is_empty());
	}

	#[test]
	fn test_escape_json_for_script() {
		assert_eq!(escape_json_for_script("</script>"), "<\\/script>");
		assert_eq!(
			escape_json_for_script("</script><script>alert(1)</script>"),
			"<\\/script><script>alert(1)<\\/script>"
		);
		assert_eq!(
			escape_json_for_script(r#"{"name":"test"}"#),
			r#"{"name":"test"}"#
		);
	}

	struct Banner {
		message: String,
	}

	impl Component for Banner {
		fn render(&self) -> Page {
			PageElement::new("header")
				.child(self.message.clone())
				.into_page()
		}

		fn name() -> &'static str {
			"Banner"
		}
	}

	#[test]
	fn test_component_render() {
		let banner = Banner {
			message: "welcome".to_string(),
		};
		assert_eq!(banner.render().render_to_string(), "<header>welcome</header>");
		assert_eq!(Banner::name(), "Banner");
	}
}
