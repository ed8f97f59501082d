//! File-path to route-path conversion.

use nimbus_conf::PagesConfig;
use std::path::Path;

/// Converts a page file path into its route path under the given
/// configuration.
///
/// The conversion strips the routes-directory prefix and the page
/// file extension, normalizes separators, collapses a trailing `page`
/// filename to its parent directory (the routes root becomes `/`),
/// rewrites `[name]` directories to `:name` captures and `[...name]`
/// to `*name` catch-alls, and applies the trailing-slash policy (the
/// root path is exempt).
///
/// The function is idempotent for already-converted static paths:
/// feeding a route path back through it yields the same path.
pub fn file_path_to_route_path(file_path: impl AsRef<Path>, config: &PagesConfig) -> String {
	let mut path = file_path
		.as_ref()
		.to_string_lossy()
		.replace('\\', "/");

	// Strip the routes-directory prefix.
	let routes_prefix = config.routes_dir.to_string_lossy().replace('\\', "/");
	if let Some(rest) = path
		.strip_prefix(&routes_prefix)
		.or_else(|| path.strip_prefix(routes_prefix.trim_start_matches("./")))
	{
		path = rest.to_string();
	}
	if !path.starts_with('/') {
		path = format!("/{}", path);
	}

	// Strip a recognized page extension, first match wins.
	for ext in &config.page_extensions {
		let suffix = format!(".{}", ext);
		if let Some(stripped) = path.strip_suffix(&suffix) {
			path = stripped.to_string();
			break;
		}
	}

	// Collapse a trailing `page` filename to the parent path.
	if path == "/page" {
		path = "/".to_string();
	} else if let Some(parent) = path.strip_suffix("/page") {
		path = parent.to_string();
	}

	if path.is_empty() {
		path = "/".to_string();
	}

	// Rewrite dynamic-segment directories to capture syntax.
	let rewritten: Vec<String> = path
		.split('/')
		.map(|segment| {
			if let Some(inner) = segment
				.strip_prefix("[...")
				.and_then(|s| s.strip_suffix(']'))
			{
				format!("*{}", inner)
			} else if let Some(inner) =
				segment.strip_prefix('[').and_then(|s| s.strip_suffix(']'))
			{
				format!(":{}", inner)
			} else {
				segment.to_string()
			}
		})
		.collect();
	path = rewritten.join("/");

	// Trailing-slash policy; the root is exempt.
	if path != "/" {
		if config.trailing_slash && !path.ends_with('/') {
			path.push('/');
		} else if !config.trailing_slash {
			while path.len() > 1 && path.ends_with('/') {
				path.pop();
			}
		}
	}

	path
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::path::PathBuf;

	fn config_with(extensions: &[&str], trailing_slash: bool) -> PagesConfig {
		PagesConfig {
			routes_dir: PathBuf::from("src/app"),
			page_extensions: extensions.iter().map(|ext| ext.to_string()).collect(),
			trailing_slash,
			..PagesConfig::default()
		}
	}

	#[rstest]
	#[case("src/app/page.rs", "/")]
	#[case("src/app/about/page.rs", "/about")]
	#[case("src/app/docs/[...path]/page.rs", "/docs/*path")]
	#[case(r"src/app\shop\items\page.rs", "/shop/items")]
	fn test_conversion(#[case] file_path: &str, #[case] expected: &str) {
		let config = config_with(&["rs"], false);
		assert_eq!(file_path_to_route_path(file_path, &config), expected);
	}

	#[test]
	fn test_dynamic_segment_rewrite() {
		let config = config_with(&["tsx", "ts"], false);
		assert_eq!(
			file_path_to_route_path("src/app/blog/[slug]/page.tsx", &config),
			"/blog/:slug"
		);
	}

	#[test]
	fn test_trailing_slash_appended() {
		let config = config_with(&["rs"], true);
		assert_eq!(
			file_path_to_route_path("src/app/about/page.rs", &config),
			"/about/"
		);
		// The root is exempt from the policy.
		assert_eq!(file_path_to_route_path("src/app/page.rs", &config), "/");
	}

	#[test]
	fn test_idempotent_for_static_routes() {
		let config = config_with(&["rs"], false);
		let converted = file_path_to_route_path("src/app/shop/items/page.rs", &config);
		assert_eq!(file_path_to_route_path(&converted, &config), converted);
		assert!(!converted.contains('[') && !converted.contains(']'));
	}

	#[test]
	fn test_extension_checked_in_order() {
		// "page.rs" must not lose a ".page" suffix when "page" is a
		// configured extension further down the list.
		let config = config_with(&["rs", "page"], false);
		assert_eq!(
			file_path_to_route_path("src/app/about/page.rs", &config),
			"/about"
		);
	}

	#[test]
	fn test_absolute_routes_dir() {
		let config = PagesConfig {
			routes_dir: PathBuf::from("/tmp/site/src/app"),
			..PagesConfig::default()
		};
		assert_eq!(
			file_path_to_route_path("/tmp/site/src/app/contact/page.rs", &config),
			"/contact"
		);
	}
}
