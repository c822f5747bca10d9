use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::app::{ProfileField, ProfileForm};
use crate::store::schema::UserProfile;
use crate::ui::components::text_field::input_line;
use crate::ui::theme::Theme;

pub struct ProfileView<'a> {
    pub form: &'a ProfileForm,
    pub profile: Option<&'a UserProfile>,
    pub theme_name: &'a str,
    pub theme: &'a Theme,
}

impl<'a> ProfileView<'a> {
    pub fn new(
        form: &'a ProfileForm,
        profile: Option<&'a UserProfile>,
        theme_name: &'a str,
        theme: &'a Theme,
    ) -> Self {
        Self {
            form,
            profile,
            theme_name,
            theme,
        }
    }

    /// Describe the stored picture without rendering it.
    fn picture_status(&self) -> String {
        if self.form.remove_picture {
            return "will be removed on save".to_string();
        }
        match self.profile.and_then(|p| p.profile_picture.as_deref()) {
            Some(url) => {
                let mime = url
                    .strip_prefix("data:")
                    .and_then(|rest| rest.split(';').next())
                    .unwrap_or("image");
                format!("{mime}, {} KB encoded", url.len() / 1024)
            }
            None => "none".to_string(),
        }
    }
}

impl Widget for ProfileView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Profile ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut constraints = vec![Constraint::Length(2)];
        constraints.extend(ProfileField::ALL.iter().map(|_| Constraint::Length(3)));
        constraints.extend([Constraint::Length(3), Constraint::Min(0)]);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        let hint = if self.form.editing {
            " [Enter] Done  [Esc] Done"
        } else {
            " [Up/Down] Select  [Enter] Edit  [s] Save  [x] Remove picture  [t] Theme  [L] Log out"
        };
        Paragraph::new(Line::from(Span::styled(hint, Style::default().fg(colors.muted()))))
            .render(layout[0], buf);

        for (i, field) in ProfileField::ALL.iter().enumerate() {
            let selected = i == self.form.selected;
            let focused = selected && self.form.editing;
            let border = if focused {
                colors.border_focused()
            } else if selected {
                colors.accent()
            } else {
                colors.border()
            };
            let placeholder = match field {
                ProfileField::Picture => "Tab completes image paths; blank keeps the current picture",
                ProfileField::TargetDate => "e.g. 2026-12-15",
                ProfileField::Name => "",
            };
            Paragraph::new(input_line(self.form.input(*field), focused, placeholder, self.theme))
                .block(
                    Block::bordered()
                        .title(format!(" {} ", field.label()))
                        .border_style(Style::default().fg(border)),
                )
                .render(layout[i + 1], buf);
        }

        let status_area = layout[ProfileField::ALL.len() + 1];
        let mut status = vec![Line::from(vec![
            Span::styled(" Current picture: ", Style::default().fg(colors.muted())),
            Span::styled(self.picture_status(), Style::default().fg(colors.fg())),
            Span::styled("   Theme: ", Style::default().fg(colors.muted())),
            Span::styled(self.theme_name, Style::default().fg(colors.fg())),
        ])];
        if let Some(ref error) = self.form.error {
            status.push(Line::from(Span::styled(
                format!(" {error}"),
                Style::default().fg(colors.error()).add_modifier(Modifier::BOLD),
            )));
        }
        Paragraph::new(status).render(status_area, buf);
    }
}
