//! Floor-plan editor view: toolbox palette, thumbnail strip, the annotated
//! canvas, and the inline marker edit panel. One instance renders per
//! floor; the armed tool comes in from the shell so it is shared by every
//! floor on screen.

use iced::widget::{button, canvas, column, container, image, mouse_area, row, stack, text, text_input};
use iced::{Alignment, Border, Color, Element, Length, Shadow, Theme};
use iced_aw::Wrap;

use crate::state::editor::EditorSession;
use crate::state::household::{Floor, FloorPath};
use crate::state::image::FloorImage;
use crate::state::marker::{Marker, MarkerId, MarkerKind};
use crate::ui::plan_canvas::PlanCanvas;
use crate::Message;

const ACCENT: Color = Color::from_rgb(0.86, 0.15, 0.15);
const MUTED: Color = Color::from_rgb(0.45, 0.50, 0.55);

/// Build the whole editor block for one floor.
pub fn floor_plan_editor<'a>(
    floor: &'a Floor,
    path: FloorPath,
    session: Option<&EditorSession>,
    armed: Option<MarkerKind>,
    toolbox_drag: bool,
) -> Element<'a, Message> {
    let editing = session.and_then(EditorSession::editing);

    let mut content = column![
        toolbox(armed),
        text("Kéo thả icon hoặc ghi chú vào sơ đồ bên dưới")
            .size(11)
            .color(MUTED),
        thumbnails(floor, path),
    ]
    .spacing(10);

    match floor.gallery.active() {
        Some(active) => {
            content = content.push(plan_area(active, path, editing, armed, toolbox_drag));
            content = content.push(
                text("Hướng dẫn: Kéo thả các icon để thay đổi vị trí trực tiếp trên ảnh")
                    .size(10)
                    .color(MUTED),
            );
            if let Some(marker) = editing.and_then(|id| active.marker(id)) {
                content = content.push(edit_panel(marker, path));
            }
        }
        None => {
            content = content.push(
                container(
                    text("Tải sơ đồ hoặc ảnh hiện trạng lên để bắt đầu.")
                        .size(13)
                        .color(MUTED),
                )
                .width(Length::Fill)
                .height(180)
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .style(placeholder_style),
            );
        }
    }

    content.into()
}

/// Draggable, clickable palette of every marker kind. Clicking toggles the
/// armed tool; pressing and dragging onto a canvas drops a new marker.
fn toolbox<'a>(armed: Option<MarkerKind>) -> Element<'a, Message> {
    let chips: Vec<Element<'a, Message>> = MarkerKind::ALL
        .into_iter()
        .map(|kind| {
            let entry = kind.catalog();
            let is_armed = armed == Some(kind);
            let chip = container(
                row![
                    text(entry.icon).size(14).shaping(text::Shaping::Advanced),
                    text(entry.default_label)
                        .size(11)
                        .shaping(text::Shaping::Advanced),
                ]
                .spacing(6)
                .align_y(Alignment::Center),
            )
            .padding([6.0, 10.0])
            .style(move |_theme: &Theme| chip_style(is_armed));

            mouse_area(chip)
                .on_press(Message::ToolDragStarted(kind))
                .on_release(Message::ToolClicked(kind))
                .into()
        })
        .collect();

    Wrap::with_elements(chips)
        .spacing(8.0)
        .line_spacing(8.0)
        .into()
}

/// Thumbnail strip plus the upload tile.
fn thumbnails<'a>(floor: &'a Floor, path: FloorPath) -> Element<'a, Message> {
    let active_id = floor.gallery.active_id();

    let mut tiles: Vec<Element<'a, Message>> = floor
        .gallery
        .images()
        .iter()
        .map(|img| {
            let is_active = active_id == Some(img.id);
            let thumb = mouse_area(
                container(
                    image(img.data.handle())
                        .width(Length::Fixed(88.0))
                        .height(Length::Fixed(88.0)),
                )
                .style(move |_theme: &Theme| thumbnail_style(is_active)),
            )
            .on_press(Message::ImageSelected(path, img.id));

            column![
                thumb,
                button(text("✕").size(10))
                    .padding([2.0, 8.0])
                    .style(button::danger)
                    .on_press(Message::ImageRemoved(path, img.id)),
            ]
            .spacing(2)
            .align_x(Alignment::Center)
            .into()
        })
        .collect();

    tiles.push(
        button(
            column![text("+").size(22), text("Ảnh/Sơ đồ").size(9)]
                .spacing(2)
                .align_x(Alignment::Center),
        )
        .width(Length::Fixed(88.0))
        .height(Length::Fixed(88.0))
        .style(button::secondary)
        .on_press(Message::AddImagesRequested(path))
        .into(),
    );

    Wrap::with_elements(tiles)
        .spacing(8.0)
        .line_spacing(8.0)
        .into()
}

/// The active image with the marker overlay canvas stacked on top. The
/// canvas fills the same box as the image widget, so canvas bounds are the
/// rendered image box the coordinate mapper normalizes against.
fn plan_area<'a>(
    active: &'a FloorImage,
    path: FloorPath,
    editing: Option<MarkerId>,
    armed: Option<MarkerKind>,
    toolbox_drag: bool,
) -> Element<'a, Message> {
    let overlay = PlanCanvas {
        floor: path,
        markers: active.markers(),
        editing,
        toolbox_drag,
        armed,
    };

    stack![
        image(active.data.handle()).width(Length::Fill),
        canvas(overlay).width(Length::Fill).height(Length::Fill),
    ]
    .into()
}

/// Inline editor for the focused marker. Edits apply on every keystroke;
/// Enter (or "Xong") just closes the panel.
fn edit_panel<'a>(marker: &'a Marker, path: FloorPath) -> Element<'a, Message> {
    let id = marker.id;
    let is_note = marker.kind == MarkerKind::Note;

    let header = if is_note {
        "Nội dung văn bản"
    } else {
        "Chỉnh sửa định danh"
    };
    let label_placeholder = if is_note {
        "Nhập nội dung cần hiển thị..."
    } else {
        "Ví dụ: Phòng ngủ 1, Cửa sau..."
    };

    let note_value = marker.note.clone();
    let label_input = text_input(label_placeholder, &marker.label)
        .size(13)
        .on_input(move |label| Message::MarkerRelabeled {
            floor: path,
            id,
            label,
            note: note_value.clone(),
        })
        .on_submit(Message::EditorClosed(path));

    let mut panel = column![text(header).size(10).color(MUTED), label_input].spacing(8);

    if !is_note {
        let label_value = marker.label.clone();
        panel = panel.push(
            text_input("Ghi chú thêm (không hiện trên ảnh)...", &marker.note)
                .size(11)
                .on_input(move |note| Message::MarkerRelabeled {
                    floor: path,
                    id,
                    label: label_value.clone(),
                    note,
                }),
        );
    }

    panel = panel.push(
        row![
            button(text("Xong").size(11))
                .style(button::primary)
                .on_press(Message::EditorClosed(path)),
            button(text("Xóa").size(11))
                .style(button::danger)
                .on_press(Message::MarkerRemoved(path, id)),
        ]
        .spacing(8),
    );

    container(panel)
        .padding(12)
        .width(Length::Fixed(260.0))
        .style(panel_style)
        .into()
}

fn chip_style(armed: bool) -> container::Style {
    if armed {
        container::Style {
            text_color: Some(Color::WHITE),
            background: Some(ACCENT.into()),
            border: Border {
                color: ACCENT,
                width: 2.0,
                radius: 10.0.into(),
            },
            shadow: Shadow::default(),
        }
    } else {
        container::Style {
            text_color: None,
            background: Some(Color::WHITE.into()),
            border: Border {
                color: Color::from_rgb(0.88, 0.90, 0.92),
                width: 2.0,
                radius: 10.0.into(),
            },
            shadow: Shadow::default(),
        }
    }
}

fn thumbnail_style(active: bool) -> container::Style {
    container::Style {
        text_color: None,
        background: None,
        border: Border {
            color: if active {
                ACCENT
            } else {
                Color::from_rgb(0.88, 0.90, 0.92)
            },
            width: 2.0,
            radius: 8.0.into(),
        },
        shadow: Shadow::default(),
    }
}

fn placeholder_style(_theme: &Theme) -> container::Style {
    container::Style {
        text_color: None,
        background: Some(Color::from_rgb(0.97, 0.98, 0.99).into()),
        border: Border {
            color: Color::from_rgb(0.88, 0.90, 0.92),
            width: 1.0,
            radius: 12.0.into(),
        },
        shadow: Shadow::default(),
    }
}

fn panel_style(_theme: &Theme) -> container::Style {
    container::Style {
        text_color: None,
        background: Some(Color::WHITE.into()),
        border: Border {
            color: Color::from_rgb(0.64, 0.68, 0.74),
            width: 2.0,
            radius: 12.0.into(),
        },
        shadow: Shadow::default(),
    }
}
