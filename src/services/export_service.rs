use crate::error::Result;
use crate::models::account::{Account, AccountStatus};
use rust_xlsxwriter::*;

pub struct ExportService;

impl ExportService {
    fn status_color(status: AccountStatus) -> Color {
        match status {
            AccountStatus::Unverified => Color::RGB(0x64748B),
            AccountStatus::UnderReview => Color::RGB(0xF59E0B),
            AccountStatus::Active => Color::RGB(0x10B981),
            AccountStatus::Rejected => Color::RGB(0xEF4444),
            AccountStatus::Suspended => Color::RGB(0x8B5CF6),
            AccountStatus::Deleted => Color::RGB(0x1E293B),
        }
    }

    fn status_label(status: AccountStatus) -> &'static str {
        match status {
            AccountStatus::Unverified => "Unverified",
            AccountStatus::UnderReview => "Under review",
            AccountStatus::Active => "Active",
            AccountStatus::Rejected => "Rejected",
            AccountStatus::Suspended => "Suspended",
            AccountStatus::Deleted => "Deleted",
        }
    }

    /// Styled XLSX workbook of accounts for the back-office.
    pub fn generate_accounts_xlsx(accounts: &[Account]) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Accounts")?;

        let title_bg = Color::RGB(0x1E293B);
        let header_bg = Color::RGB(0x0F172A);
        let border_color = Color::RGB(0xE2E8F0);

        let columns = [
            ("#", 6.0),
            ("Name", 28.0),
            ("Email", 32.0),
            ("Phone", 16.0),
            ("Role", 12.0),
            ("Status", 16.0),
            ("Status reason", 40.0),
            ("Registered", 18.0),
            ("Last login", 18.0),
        ];
        let last_col = (columns.len() - 1) as u16;

        for (i, (_, width)) in columns.iter().enumerate() {
            worksheet.set_column_width(i as u16, *width)?;
        }

        let title_format = Format::new()
            .set_font_size(16)
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(title_bg)
            .set_align(FormatAlign::CenterAcross)
            .set_align(FormatAlign::VerticalCenter);
        worksheet.set_row_height(0, 36)?;
        worksheet.merge_range(0, 0, 0, last_col, "BagoScout accounts", &title_format)?;

        let subtitle_format = Format::new()
            .set_font_size(10)
            .set_italic()
            .set_font_color(Color::RGB(0x94A3B8))
            .set_background_color(title_bg)
            .set_align(FormatAlign::CenterAcross);
        let exported = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC");
        worksheet.merge_range(
            1,
            0,
            1,
            last_col,
            &format!("Exported {}  |  {} accounts", exported, accounts.len()),
            &subtitle_format,
        )?;

        let header_format = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(Color::White)
            .set_background_color(header_bg)
            .set_align(FormatAlign::Center)
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);
        let header_row = 2;
        for (i, (name, _)) in columns.iter().enumerate() {
            worksheet.write_string_with_format(header_row, i as u16, *name, &header_format)?;
        }

        let data_start_row = 3;
        for (idx, account) in accounts.iter().enumerate() {
            let row = data_start_row + idx as u32;
            let bg = if idx % 2 == 0 {
                Color::RGB(0xF8FAFC)
            } else {
                Color::White
            };
            let base_fmt = Format::new()
                .set_font_size(10)
                .set_background_color(bg)
                .set_border(FormatBorder::Thin)
                .set_border_color(border_color);
            let center_fmt = base_fmt.clone().set_align(FormatAlign::Center);
            let wrap_fmt = base_fmt.clone().set_text_wrap();
            let status_fmt = Format::new()
                .set_font_size(10)
                .set_bold()
                .set_font_color(Color::White)
                .set_background_color(Self::status_color(account.status))
                .set_align(FormatAlign::Center)
                .set_border(FormatBorder::Thin)
                .set_border_color(border_color);

            worksheet.write_number_with_format(row, 0, (idx + 1) as f64, &center_fmt)?;
            worksheet.write_string_with_format(row, 1, account.full_name(), &base_fmt.clone().set_bold())?;
            worksheet.write_string_with_format(row, 2, &account.email, &base_fmt)?;
            worksheet.write_string_with_format(row, 3, account.phone.as_deref().unwrap_or("-"), &base_fmt)?;
            worksheet.write_string_with_format(row, 4, account.role.as_str(), &center_fmt)?;
            worksheet.write_string_with_format(row, 5, Self::status_label(account.status), &status_fmt)?;
            worksheet.write_string_with_format(
                row,
                6,
                account.status_reason.as_deref().unwrap_or("-"),
                &wrap_fmt,
            )?;
            worksheet.write_string_with_format(
                row,
                7,
                account.created_at.format("%Y-%m-%d %H:%M").to_string(),
                &center_fmt,
            )?;
            let last_login = account
                .last_login_at
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string());
            worksheet.write_string_with_format(row, 8, &last_login, &center_fmt)?;
        }

        let summary_row = data_start_row + accounts.len() as u32 + 1;
        let summary_fmt = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(title_bg)
            .set_background_color(Color::RGB(0xE0E7FF))
            .set_align(FormatAlign::Center)
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);
        let summary = AccountStatus::ALL
            .iter()
            .map(|s| {
                let n = accounts.iter().filter(|a| a.status == *s).count();
                format!("{}: {}", Self::status_label(*s), n)
            })
            .collect::<Vec<_>>()
            .join(" | ");
        worksheet.merge_range(summary_row, 0, summary_row, last_col, &summary, &summary_fmt)?;

        worksheet.set_freeze_panes(3, 0)?;
        let last_data_row = (data_start_row + accounts.len() as u32).saturating_sub(1).max(header_row);
        worksheet.autofilter(header_row, 0, last_data_row, last_col)?;

        Ok(workbook.save_to_buffer()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::account::Role;
    use crate::services::memory_store::account;

    #[test]
    fn produces_a_zip_container() {
        let accounts = vec![
            account(Role::Employer, AccountStatus::UnderReview),
            account(Role::Jobseeker, AccountStatus::Suspended),
        ];
        let bytes = ExportService::generate_accounts_xlsx(&accounts).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn empty_export_still_builds() {
        tokio_test::assert_ok!(ExportService::generate_accounts_xlsx(&[]));
    }
}
