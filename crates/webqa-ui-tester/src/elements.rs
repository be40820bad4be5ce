use webqa_dom::ElementBuffer;

/// Renders the element buffer as `id: <tag> "text"` lines, the
/// pageDescription half of the planner prompt.
pub fn describe_elements(buffer: &ElementBuffer) -> String {
    let mut entries: Vec<(String, String)> = buffer
        .iter()
        .map(|(id, el)| {
            let tag = el.tag.as_deref().unwrap_or("?");
            (id.clone(), format!("{id}: <{tag}> \"{}\"", el.inner_text))
        })
        .collect();
    entries.sort_by(|a, b| {
        a.0.parse::<u64>()
            .unwrap_or(0)
            .cmp(&b.0.parse::<u64>().unwrap_or(0))
    });
    entries.into_iter().map(|(_, line)| line).collect::<Vec<_>>().join("\n")
}
