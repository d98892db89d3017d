/// Render the commit document for a block list.
///
/// The destination assembles the object in exactly the order identifiers
/// appear here, so callers must pass ids in ascending index order. Every id
/// is referenced as `Latest`, taking the most recently staged bytes for that
/// identifier.
pub fn block_list_xml(block_ids: &[String]) -> String {
    let mut s = String::with_capacity(
        64 + block_ids.iter().map(|id| id.len() + 17).sum::<usize>(),
    );

    s.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>");
    s.push_str("<BlockList>");
    for id in block_ids {
        s.push_str("<Latest>");
        // Block ids are base64, no XML escaping needed.
        s.push_str(id);
        s.push_str("</Latest>");
    }
    s.push_str("</BlockList>");

    s
}
