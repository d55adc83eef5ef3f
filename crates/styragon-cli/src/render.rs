//! Plain-text rendering of site surfaces for the terminal.

use styragon_core::admin::AdminEntity;
use styragon_core::models::{Lead, Post, Project, Service, Testimonial};
use styragon_core::pagination::Pagination;
use styragon_core::site::{BlogIndexPage, BlogSection};

/// Truncate text to a maximum number of characters, adding an ellipsis if needed
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if cleaned.chars().count() <= max_chars {
        cleaned
    } else {
        let cut: String = cleaned.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    }
}

fn post_line(post: &Post) -> String {
    let mut line = post.title.clone();
    if post.featured {
        line.push_str(" [featured]");
    }
    if let Some(category) = post.category_name() {
        line.push_str(&format!(" ({})", category));
    }
    line
}

/// `‹ 2 3 [4] 5 6 ›` style page strip.
pub fn page_strip(pagination: &Pagination) -> String {
    let mut parts = Vec::new();
    if pagination.has_previous() {
        parts.push("‹".to_string());
    }
    for page in &pagination.visible_pages {
        if *page == pagination.effective_page {
            parts.push(format!("[{}]", page));
        } else {
            parts.push(page.to_string());
        }
    }
    if pagination.has_next() {
        parts.push("›".to_string());
    }
    parts.join(" ")
}

pub fn blog_index(page: &BlogIndexPage) -> String {
    let mut out = String::new();
    if page.posts.is_empty() {
        out.push_str("No articles found.\n");
    }
    for post in &page.posts {
        out.push_str(&format!("• {}\n", post_line(post)));
        out.push_str(&format!("  /blog/{} · {} min read\n", post.slug, post.read_time));
        if !post.excerpt.is_empty() {
            out.push_str(&format!("  {}\n", truncate_text(&post.excerpt, 120)));
        }
    }
    out.push_str(&format!(
        "\nPage {} of {} ({} posts)\n",
        page.pagination.effective_page, page.pagination.total_pages, page.pagination.total_count
    ));
    if page.pagination.needs_controls() {
        out.push_str(&page_strip(&page.pagination));
        out.push('\n');
    }
    out
}

pub fn post(post: &Post) -> String {
    let mut out = format!("{}\n", post.title);
    if let Some(author) = &post.author {
        out.push_str(&format!("by {}", author.name));
    }
    if let Some(published_at) = post.published_at {
        out.push_str(&format!(" · {}", published_at.format("%B %-d, %Y")));
    }
    out.push_str(&format!(" · {} min read\n\n", post.read_time));
    out.push_str(&post.content);
    out.push('\n');
    if !post.tags.is_empty() {
        out.push_str(&format!("\nTags: {}\n", post.tags.join(", ")));
    }
    out
}

pub fn project(project: &Project) -> String {
    let mut out = format!("{} [{}]\n", project.title, project.status);
    if let Some(client) = &project.client_name {
        out.push_str(&format!("Client: {}\n", client));
    }
    if !project.technologies.is_empty() {
        out.push_str(&format!("Stack: {}\n", project.technologies.join(", ")));
    }
    out.push_str(&format!("\n{}\n", project.description));
    for (label, section) in [
        ("Challenge", &project.challenge),
        ("Solution", &project.solution),
        ("Results", &project.results),
    ] {
        if let Some(text) = section {
            out.push_str(&format!("\n{}\n{}\n", label, text));
        }
    }
    out
}

pub fn blog_section(section: &BlogSection) -> String {
    let mut out = format!("Categories: {}\n\n", section.category_labels.join(" | "));
    if section.display.is_empty() {
        out.push_str("No posts in this category yet.\n");
    }
    for post in section.display.iter() {
        out.push_str(&format!("• {}\n", post_line(post)));
    }
    out
}

pub fn case_studies(projects: &[Project]) -> String {
    projects
        .iter()
        .map(|p| format!("• {} /work/{}\n  {}\n", p.title, p.slug, truncate_text(&p.description, 120)))
        .collect()
}

pub fn testimonials(items: &[Testimonial]) -> String {
    items
        .iter()
        .map(|t| {
            let byline = [t.client_title.as_deref(), t.client_company.as_deref()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "{} \"{}\"\n  {}{}\n",
                "★".repeat(t.rating.clamp(0, 5) as usize),
                truncate_text(&t.content, 160),
                t.client_name,
                if byline.is_empty() { String::new() } else { format!(" ({})", byline) }
            )
        })
        .collect()
}

pub fn services(items: &[Service]) -> String {
    items
        .iter()
        .map(|s| {
            let icon = s.icon.map(|i| i.as_str()).unwrap_or("-");
            format!("{:>2}. {} [{}]\n    {}\n", s.order_index, s.title, icon, s.description)
        })
        .collect()
}

pub fn leads(items: &[Lead]) -> String {
    if items.is_empty() {
        return "No leads yet.\n".to_string();
    }
    items
        .iter()
        .map(|l| {
            format!(
                "{}  {} <{}>  {}{}\n",
                l.created_at.format("%Y-%m-%d %H:%M"),
                l.name,
                l.email,
                l.project_type,
                l.file_url.as_deref().map(|u| format!("  📎 {}", u)).unwrap_or_default()
            )
        })
        .collect()
}

/// One admin list row: id, flags, title.
pub fn admin_row<E: AdminEntity>(item: &E) -> String {
    let flag = |value: Option<bool>, on: &'static str, off: &'static str| match value {
        Some(true) => on,
        Some(false) => off,
        None => " ",
    };
    format!(
        "{:>6}  {}{}  {}",
        item.id(),
        flag(item.published(), "P", "D"),
        flag(item.featured(), "★", " "),
        item.search_fields()[0]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use styragon_core::models::Category;
    use styragon_core::pagination::paginate;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("a  b\n c", 10), "a b c");
        assert_eq!(truncate_text("hello wonderful world", 5), "hello...");
        assert_eq!(truncate_text("ééééé", 3), "ééé...");
    }

    #[test]
    fn test_page_strip() {
        assert_eq!(page_strip(&paginate(47, 9, 1)), "[1] 2 3 4 5 ›");
        assert_eq!(page_strip(&paginate(47, 9, 6)), "‹ 2 3 4 5 [6]");
    }

    #[test]
    fn test_admin_row_for_flagless_type() {
        let category = Category {
            id: 3,
            name: "Design".to_string(),
            slug: "design".to_string(),
            description: None,
            color: "#f59e0b".to_string(),
        };
        assert_eq!(admin_row(&category), "     3      Design");
    }
}
