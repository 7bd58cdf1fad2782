pub fn render_schema() -> String {
	let init = include_str!("../../../sql/init.sql");

	expand_includes(init)
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_classification_codes.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_classification_codes.sql")),
				"tables/002_procurement_records.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_procurement_records.sql")),
				"tables/003_user_categories.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_user_categories.sql")),
				"tables/004_user_interest_bindings.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_user_interest_bindings.sql")),
				"tables/005_user_stop_words.sql" =>
					out.push_str(include_str!("../../../sql/tables/005_user_stop_words.sql")),
				"tables/006_interest_overrides.sql" =>
					out.push_str(include_str!("../../../sql/tables/006_interest_overrides.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
