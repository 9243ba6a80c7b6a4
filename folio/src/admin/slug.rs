//! URL slugs for projects and blog posts.

/// Derive a slug from a title: lowercase, with every run of whitespace collapsed into one hyphen.
///
/// No other characters are touched, so `"Hello, World!"` becomes `"hello,-world!"`. Uniqueness is
/// left to the `*_slug_unique` constraints.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut in_whitespace = false;
    for c in title.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
        } else {
            in_whitespace = false;
            slug.extend(c.to_lowercase());
        }
    }
    slug
}

/// The slug to store for a draft: the editor's own slug if they gave one, otherwise derived.
pub fn slug_or_derive(slug: &str, title: &str) -> String {
    let slug = slug.trim();
    if slug.is_empty() { slugify(title) } else { slug.to_string() }
}
