//! Section / Rule / MediaSection repository (spec §3, §4.7).
//!
//! Smart-section listing compiles its rule set against the `media`
//! (movie) table — the table the spec's index list (§6) actually names
//! for rule compilation — via `rules::compile_where_clause`.

use sqlx::Row;

use super::models::{MediaRow, RuleRow, SectionRow};
use super::Store;
use crate::error::{AppError, Result};
use crate::ids::{MediaKind, SectionId};
use crate::rules::{compile_where_clause, Rule, RuleBind};

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct SectionUpsert {
    pub name: String,
    pub slug: String,
    pub icon: Option<String>,
    pub section_type: String,
    pub display_order: i64,
    pub is_visible: bool,
}

impl Store {
    pub async fn create_section(&self, s: &SectionUpsert) -> Result<SectionId> {
        let _guard = self.write_guard().await;
        let row = sqlx::query(
            r#"INSERT INTO sections (name, slug, icon, section_type, display_order, is_visible)
               VALUES (?,?,?,?,?,?) RETURNING id"#,
        )
        .bind(&s.name)
        .bind(&s.slug)
        .bind(&s.icon)
        .bind(&s.section_type)
        .bind(s.display_order)
        .bind(s.is_visible)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::ConflictBusy(format!("section slug '{}' already exists", s.slug))
            }
            other => AppError::from(other),
        })?;
        Ok(SectionId(row.get::<i64, _>("id")))
    }

    pub async fn update_section(&self, id: SectionId, s: &SectionUpsert) -> Result<()> {
        let _guard = self.write_guard().await;
        sqlx::query(
            r#"UPDATE sections SET name=?, slug=?, icon=?, section_type=?, display_order=?, is_visible=?
               WHERE id=?"#,
        )
        .bind(&s.name)
        .bind(&s.slug)
        .bind(&s.icon)
        .bind(&s.section_type)
        .bind(s.display_order)
        .bind(s.is_visible)
        .bind(id.get())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete_section(&self, id: SectionId) -> Result<()> {
        let _guard = self.write_guard().await;
        sqlx::query("DELETE FROM section_rules WHERE section_id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM media_sections WHERE section_id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM sections WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn get_section(&self, id: SectionId) -> Result<SectionRow> {
        sqlx::query_as::<_, SectionRow>("SELECT * FROM sections WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound { kind: "section" })
    }

    pub async fn list_sections(&self) -> Result<Vec<SectionRow>> {
        Ok(sqlx::query_as::<_, SectionRow>(
            "SELECT * FROM sections ORDER BY display_order ASC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn reorder_sections(&self, ordered_ids: &[SectionId]) -> Result<()> {
        let _guard = self.write_guard().await;
        let mut tx = self.pool.begin().await?;
        for (position, id) in ordered_ids.iter().enumerate() {
            sqlx::query("UPDATE sections SET display_order = ? WHERE id = ?")
                .bind(position as i64)
                .bind(id.get())
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn set_rules(&self, section_id: SectionId, rules: &[Rule]) -> Result<()> {
        let _guard = self.write_guard().await;
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM section_rules WHERE section_id = ?")
            .bind(section_id.get())
            .execute(&mut *tx)
            .await?;
        for (order, rule) in rules.iter().enumerate() {
            sqlx::query(
                "INSERT INTO section_rules (section_id, field, operator, value_json, rule_order) VALUES (?,?,?,?,?)",
            )
            .bind(section_id.get())
            .bind(&rule.field)
            .bind(rule.operator.as_str())
            .bind(&rule.value_json)
            .bind(order as i64)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn list_rules(&self, section_id: SectionId) -> Result<Vec<Rule>> {
        let rows = sqlx::query_as::<_, RuleRow>(
            "SELECT * FROM section_rules WHERE section_id = ? ORDER BY rule_order ASC",
        )
        .bind(section_id.get())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|r| {
                Ok(Rule {
                    field: r.field,
                    operator: r.operator.parse()?,
                    value_json: r.value_json,
                })
            })
            .collect()
    }

    pub async fn add_manual_member(
        &self,
        section_id: SectionId,
        kind: MediaKind,
        media_id: i64,
    ) -> Result<()> {
        let _guard = self.write_guard().await;
        sqlx::query(
            "INSERT OR IGNORE INTO media_sections (media_kind, media_id, section_id) VALUES (?,?,?)",
        )
        .bind(kind.to_string())
        .bind(media_id)
        .bind(section_id.get())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn remove_manual_member(
        &self,
        section_id: SectionId,
        kind: MediaKind,
        media_id: i64,
    ) -> Result<()> {
        let _guard = self.write_guard().await;
        sqlx::query(
            "DELETE FROM media_sections WHERE media_kind = ? AND media_id = ? AND section_id = ?",
        )
        .bind(kind.to_string())
        .bind(media_id)
        .bind(section_id.get())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert a MediaSection membership row for a record C7 autotagged
    /// (spec §4.5 step 8).
    pub async fn autotag_member(
        &self,
        section_id: SectionId,
        kind: MediaKind,
        media_id: i64,
    ) -> Result<()> {
        self.add_manual_member(section_id, kind, media_id).await
    }

    /// Lists movies in a smart section by compiling its rules to SQL
    /// (spec §4.7); for standard (manual) sections, lists the
    /// `media_sections` membership instead.
    pub async fn list_section_media(
        &self,
        section_id: SectionId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MediaRow>> {
        let section = self.get_section(section_id).await?;
        if section.section_type == "smart" {
            let rules = self.list_rules(section_id).await?;
            let (clause, binds) = compile_where_clause(&rules);
            let sql = format!(
                "SELECT * FROM media WHERE {clause} ORDER BY created_at DESC LIMIT ? OFFSET ?"
            );
            let mut query = sqlx::query_as::<_, MediaRow>(&sql);
            for bind in binds {
                query = match bind {
                    RuleBind::Text(t) => query.bind(t),
                    RuleBind::Real(r) => query.bind(r),
                };
            }
            Ok(query.bind(limit).bind(offset).fetch_all(&self.pool).await?)
        } else {
            Ok(sqlx::query_as::<_, MediaRow>(
                r#"SELECT m.* FROM media m
                   JOIN media_sections ms ON ms.media_kind = 'movie' AND ms.media_id = m.id
                   WHERE ms.section_id = ?
                   ORDER BY m.title ASC LIMIT ? OFFSET ?"#,
            )
            .bind(section_id.get())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?)
        }
    }
}
