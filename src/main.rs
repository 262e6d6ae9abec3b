use std::collections::HashMap;
use std::time::Duration;

use iced::widget::{button, column, container, row, scrollable, text, text_input};
use iced::{event, mouse, Alignment, Color, Element, Event, Length, Subscription, Task, Theme};
use rfd::FileDialog;
use tracing::{info, warn};

mod brief;
mod decode;
mod geo;
mod state;
mod ui;

use decode::{DecodeError, DecodedImage};
use geo::{Coordinates, LocationError};
use state::editor::{resolve_drop, toggle_tool, EditorSession};
use state::household::{
    BuildingId, FloorId, FloorPath, HouseholdInfo, ReporterField, ResidentField,
};
use state::image::{FloorImage, ImageData, ImageId};
use state::marker::{MarkerId, MarkerKind, Position};

/// Transient bottom-corner notification.
#[derive(Debug, Clone)]
struct Toast {
    id: u64,
    message: String,
}

/// Main application state
struct FireSafe {
    /// Everything the report will carry.
    info: HouseholdInfo,
    /// The single armed tool, shared by every floor editor on the page.
    armed_tool: Option<MarkerKind>,
    /// Per-floor edit-focus sessions, created lazily.
    sessions: HashMap<FloorId, EditorSession>,
    /// A toolbox chip currently being dragged, waiting for a canvas drop.
    toolbox_drag: Option<MarkerKind>,
    toasts: Vec<Toast>,
    next_toast: u64,
    /// Blocking message shown until dismissed (failed GPS, refused submit).
    alert: Option<String>,
    locating: bool,
    generating_brief: bool,
    /// Set after a successful submit; holds the generated brief.
    submitted: Option<String>,
    /// Raw text of the quick-setup building count field.
    quick_count: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    // Step 1: location
    AddressChanged(String),
    LocateRequested,
    Located(Result<Coordinates, LocationError>),
    // Step 2: reporter
    ReporterChanged(ReporterField, String),
    // Quick setup
    QuickCountChanged(String),
    QuickSetupApplied,
    // Building / floor hierarchy
    BuildingAdded,
    BuildingRemoved(BuildingId),
    BuildingRenamed(BuildingId, String),
    FloorAdded(BuildingId),
    FloorRemoved(FloorPath),
    FloorRenamed(FloorPath, String),
    // Gallery
    AddImagesRequested(FloorPath),
    ImageDecoded(FloorPath, Result<DecodedImage, DecodeError>),
    ImageSelected(FloorPath, ImageId),
    ImageRemoved(FloorPath, ImageId),
    // Floor-plan editor
    ToolClicked(MarkerKind),
    ToolDragStarted(MarkerKind),
    CanvasClicked {
        floor: FloorPath,
        at: Position,
    },
    MarkerClicked {
        floor: FloorPath,
        id: MarkerId,
    },
    CanvasDropped {
        floor: FloorPath,
        at: Position,
        existing: Option<MarkerId>,
    },
    MarkerRelabeled {
        floor: FloorPath,
        id: MarkerId,
        label: String,
        note: String,
    },
    MarkerRemoved(FloorPath, MarkerId),
    EditorClosed(FloorPath),
    DragReleased,
    // Step 4: residents and descriptions
    ResidentIncremented(ResidentField),
    ResidentDecremented(ResidentField),
    FireEquipmentChanged(String),
    HazardsChanged(String),
    AssemblyPointChanged(String),
    // Submission
    SubmitRequested,
    BriefReady(String),
    SuccessDismissed,
    // Shell
    AlertDismissed,
    ToastExpired(u64),
}

impl FireSafe {
    fn new() -> (Self, Task<Message>) {
        info!("FireSafe Connect initialized");
        (
            FireSafe {
                info: HouseholdInfo::new(),
                armed_tool: None,
                sessions: HashMap::new(),
                toolbox_drag: None,
                toasts: Vec::new(),
                next_toast: 0,
                alert: None,
                locating: false,
                generating_brief: false,
                submitted: None,
                quick_count: "1".to_string(),
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        let task = self.handle(message);
        // Edit focus must never outlive its marker: re-validate every
        // session against its gallery after any mutation.
        self.sync_sessions();
        task
    }

    fn handle(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::AddressChanged(value) => {
                self.info.address = value;
                Task::none()
            }
            Message::LocateRequested => {
                if self.locating {
                    return Task::none();
                }
                self.locating = true;
                Task::perform(geo::current_position(), Message::Located)
            }
            Message::Located(result) => {
                self.locating = false;
                match result {
                    Ok(fix) => {
                        self.info.coordinates = Some(fix);
                        self.push_toast("Đã xác định vị trí GPS thành công.")
                    }
                    Err(e) => {
                        warn!(error = %e, "geolocation failed");
                        self.alert = Some(e.to_string());
                        Task::none()
                    }
                }
            }

            Message::ReporterChanged(field, value) => {
                self.info.reporter.set(field, value);
                Task::none()
            }

            Message::QuickCountChanged(value) => {
                self.quick_count = value;
                Task::none()
            }
            Message::QuickSetupApplied => {
                let count = self.quick_count.trim().parse::<usize>().unwrap_or(0);
                if self.info.quick_setup(count) {
                    self.push_toast(format!("Đã thiết lập {count} khối nhà riêng biệt."))
                } else {
                    Task::none()
                }
            }

            Message::BuildingAdded => {
                let name = self.info.add_building();
                self.push_toast(format!("Đã thêm {name}."))
            }
            Message::BuildingRemoved(id) => {
                // Refused for the last remaining building, silently.
                if self.info.remove_building(id) {
                    self.push_toast("Đã xóa khối nhà.")
                } else {
                    Task::none()
                }
            }
            Message::BuildingRenamed(id, name) => {
                if let Some(building) = self.info.building_mut(id) {
                    building.name = name;
                }
                Task::none()
            }
            Message::FloorAdded(building_id) => {
                let Some(building) = self.info.building_mut(building_id) else {
                    return Task::none();
                };
                let floor_id = building.add_floor();
                let floor_name = building
                    .floor(floor_id)
                    .map(|f| f.name.clone())
                    .unwrap_or_default();
                let building_name = building.name.clone();
                self.push_toast(format!("Đã thêm {floor_name} cho {building_name}."))
            }
            Message::FloorRemoved(path) => {
                if let Some(building) = self.info.building_mut(path.building) {
                    building.remove_floor(path.floor);
                }
                self.sessions.remove(&path.floor);
                self.push_toast("Đã xóa tầng.")
            }
            Message::FloorRenamed(path, name) => {
                if let Some(floor) = self.info.floor_mut(path) {
                    floor.name = name;
                }
                Task::none()
            }

            Message::AddImagesRequested(path) => {
                let files = FileDialog::new()
                    .set_title("Chọn ảnh sơ đồ tầng")
                    .add_filter("Ảnh", &["png", "jpg", "jpeg", "gif", "bmp", "webp"])
                    .pick_files();

                let Some(files) = files else {
                    return Task::none();
                };
                // One independent decode task per file; the gallery appends
                // them in completion order.
                Task::batch(files.into_iter().map(|file| {
                    Task::perform(decode::load_image(file), move |result| {
                        Message::ImageDecoded(path, result)
                    })
                }))
            }
            Message::ImageDecoded(path, Ok(decoded)) => {
                if let Some(floor) = self.info.floor_mut(path) {
                    let data = ImageData::from_decoded(decoded);
                    info!(
                        width = data.width(),
                        height = data.height(),
                        bytes = data.byte_len(),
                        "floor-plan image added"
                    );
                    floor.gallery.append(FloorImage::new(data));
                }
                Task::none()
            }
            Message::ImageDecoded(_, Err(e)) => {
                warn!(error = %e, "image decode failed");
                self.push_toast(e.to_string())
            }
            Message::ImageSelected(path, id) => {
                if let Some(floor) = self.info.floor_mut(path) {
                    floor.gallery.set_active(id);
                }
                Task::none()
            }
            Message::ImageRemoved(path, id) => {
                if let Some(floor) = self.info.floor_mut(path) {
                    floor.gallery.remove(id);
                }
                Task::none()
            }

            Message::ToolClicked(kind) => {
                // Press and release on the same chip is a click, not a drag.
                self.toolbox_drag = None;
                self.armed_tool = toggle_tool(self.armed_tool, kind);
                Task::none()
            }
            Message::ToolDragStarted(kind) => {
                self.toolbox_drag = Some(kind);
                Task::none()
            }
            Message::CanvasClicked { floor, at } => {
                self.toolbox_drag = None;
                let session = self.sessions.entry(floor.floor).or_default();
                if let Some(f) = self.info.floor_mut(floor) {
                    session.canvas_clicked(&mut f.gallery, at, self.armed_tool);
                }
                Task::none()
            }
            Message::MarkerClicked { floor, id } => {
                self.sessions.entry(floor.floor).or_default().open(id);
                Task::none()
            }
            Message::CanvasDropped { floor, at, existing } => {
                let payload = resolve_drop(self.toolbox_drag.take(), existing);
                let session = self.sessions.entry(floor.floor).or_default();
                if let (Some(payload), Some(f)) = (payload, self.info.floor_mut(floor)) {
                    session.drop_received(&mut f.gallery, at, payload);
                }
                Task::none()
            }
            Message::MarkerRelabeled {
                floor,
                id,
                label,
                note,
            } => {
                let session = self.sessions.entry(floor.floor).or_default();
                if let Some(f) = self.info.floor_mut(floor) {
                    session.relabel(&mut f.gallery, id, label, note);
                }
                Task::none()
            }
            Message::MarkerRemoved(path, id) => {
                let session = self.sessions.entry(path.floor).or_default();
                if let Some(f) = self.info.floor_mut(path) {
                    session.remove_marker(&mut f.gallery, id);
                }
                Task::none()
            }
            Message::EditorClosed(path) => {
                if let Some(session) = self.sessions.get_mut(&path.floor) {
                    session.close();
                }
                Task::none()
            }
            Message::DragReleased => {
                self.toolbox_drag = None;
                Task::none()
            }

            Message::ResidentIncremented(field) => {
                self.info.residents.increment(field);
                Task::none()
            }
            Message::ResidentDecremented(field) => {
                self.info.residents.decrement(field);
                Task::none()
            }
            Message::FireEquipmentChanged(value) => {
                self.info.fire_equipment = value;
                Task::none()
            }
            Message::HazardsChanged(value) => {
                self.info.hazards = value;
                Task::none()
            }
            Message::AssemblyPointChanged(value) => {
                self.info.assembly_point = value;
                Task::none()
            }

            Message::SubmitRequested => match self.info.validate_submission() {
                Err(e) => {
                    self.alert = Some(e.to_string());
                    Task::none()
                }
                Ok(()) => {
                    self.generating_brief = true;
                    let prompt = brief::build_prompt(&self.info);
                    Task::perform(brief::generate(prompt), Message::BriefReady)
                }
            },
            Message::BriefReady(text) => {
                self.generating_brief = false;
                self.submitted = Some(text);
                Task::none()
            }
            Message::SuccessDismissed => {
                self.submitted = None;
                Task::none()
            }

            Message::AlertDismissed => {
                self.alert = None;
                Task::none()
            }
            Message::ToastExpired(id) => {
                self.toasts.retain(|t| t.id != id);
                Task::none()
            }
        }
    }

    /// Show a toast and schedule its auto-dismissal.
    fn push_toast(&mut self, message: impl Into<String>) -> Task<Message> {
        let id = self.next_toast;
        self.next_toast += 1;
        self.toasts.push(Toast {
            id,
            message: message.into(),
        });
        Task::perform(
            async move {
                tokio::time::sleep(Duration::from_secs(3)).await;
                id
            },
            Message::ToastExpired,
        )
    }

    /// Drop sessions of deleted floors and stale edit focus everywhere.
    fn sync_sessions(&mut self) {
        let live: Vec<FloorId> = self
            .info
            .buildings
            .iter()
            .flat_map(|b| b.floors.iter().map(|f| f.id))
            .collect();
        self.sessions.retain(|id, _| live.contains(id));

        for building in &self.info.buildings {
            for floor in &building.floors {
                if let Some(session) = self.sessions.get_mut(&floor.id) {
                    session.sync(&floor.gallery);
                }
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        if let Some(brief_text) = &self.submitted {
            return self.success_view(brief_text);
        }

        let mut page = column![self.header()].spacing(24).padding(24).max_width(860);

        if let Some(alert) = &self.alert {
            page = page.push(
                container(
                    row![
                        text(alert).size(13).color(Color::from_rgb(0.7, 0.1, 0.1)),
                        button(text("✕").size(11))
                            .style(button::text)
                            .on_press(Message::AlertDismissed),
                    ]
                    .spacing(12)
                    .align_y(Alignment::Center),
                )
                .padding(12),
            );
        }

        page = page
            .push(self.location_section())
            .push(self.reporter_section())
            .push(self.quick_setup_section())
            .push(self.buildings_section())
            .push(self.residents_section())
            .push(self.descriptions_section())
            .push(self.submit_section());

        for toast in &self.toasts {
            page = page.push(text(format!("● {}", toast.message)).size(12));
        }

        scrollable(container(page).width(Length::Fill).center_x(Length::Fill))
            .height(Length::Fill)
            .into()
    }

    fn header(&self) -> Element<Message> {
        row![
            column![
                text("🚒 FireSafe Connect")
                    .size(28)
                    .shaping(text::Shaping::Advanced),
                text("Hệ thống báo cáo PCCC")
                    .size(11)
                    .shaping(text::Shaping::Advanced),
            ]
            .spacing(4),
            iced::widget::horizontal_space(),
            text("114").size(30),
        ]
        .align_y(Alignment::Center)
        .into()
    }

    fn location_section(&self) -> Element<Message> {
        let (latitude, longitude) = match self.info.coordinates {
            Some(fix) => (
                format!("{:.6}", fix.latitude),
                format!("{:.6}", fix.longitude),
            ),
            None => ("--".to_string(), "--".to_string()),
        };

        section(
            "Bước 1: Vị trí cơ sở 📍",
            column![
                text_input(
                    "Nhập địa chỉ: Số nhà, Tên đường, Phường/Xã...",
                    &self.info.address,
                )
                .on_input(Message::AddressChanged),
                button(
                    text(if self.locating {
                        "Đang định vị..."
                    } else {
                        "📍 Tự động lấy tọa độ GPS"
                    })
                    .shaping(text::Shaping::Advanced),
                )
                .width(Length::Fill)
                .on_press_maybe((!self.locating).then_some(Message::LocateRequested)),
                row![
                    labeled_value("Vĩ độ", latitude),
                    labeled_value("Kinh độ", longitude),
                ]
                .spacing(12),
            ]
            .spacing(12)
            .into(),
        )
    }

    fn reporter_section(&self) -> Element<Message> {
        let field = |placeholder, kind: ReporterField| {
            text_input(placeholder, self.info.reporter.get(kind))
                .on_input(move |v| Message::ReporterChanged(kind, v))
        };

        section(
            "Bước 2: Người báo cáo 👤",
            column![
                row![
                    field("Họ và tên...", ReporterField::FullName),
                    field("Số điện thoại...", ReporterField::Phone),
                ]
                .spacing(12),
                field(
                    "Mối quan hệ (Chủ hộ, Quản lý, Người thuê...)",
                    ReporterField::Relationship,
                ),
                row![
                    field("Số CCCD...", ReporterField::IdNumber),
                    field("Email...", ReporterField::Email),
                ]
                .spacing(12),
            ]
            .spacing(12)
            .into(),
        )
    }

    fn quick_setup_section(&self) -> Element<Message> {
        section(
            "⚙️ Số lượng khối nhà riêng biệt",
            row![
                text_input("1", &self.quick_count)
                    .width(Length::Fixed(64.0))
                    .on_input(Message::QuickCountChanged),
                button(text("Thiết lập ngay").size(11)).on_press(Message::QuickSetupApplied),
            ]
            .spacing(12)
            .align_y(Alignment::Center)
            .into(),
        )
    }

    fn buildings_section(&self) -> Element<Message> {
        let mut body = column![row![
            text("Bước 3: Sơ đồ tầng & Vị trí")
                .size(18)
                .shaping(text::Shaping::Advanced),
            iced::widget::horizontal_space(),
            button(text("+ Thêm khối nhà").size(11)).on_press(Message::BuildingAdded),
        ]
        .align_y(Alignment::Center)]
        .spacing(16);

        for building in &self.info.buildings {
            let building_id = building.id;

            let mut block = column![row![
                text_input("Tên khối nhà...", &building.name)
                    .size(16)
                    .on_input(move |v| Message::BuildingRenamed(building_id, v)),
                button(text("+ Tầng").size(11)).on_press(Message::FloorAdded(building_id)),
                button(text("✕").size(11))
                    .style(button::text)
                    .on_press(Message::BuildingRemoved(building_id)),
            ]
            .spacing(8)
            .align_y(Alignment::Center)]
            .spacing(16);

            for floor in &building.floors {
                let path = FloorPath {
                    building: building_id,
                    floor: floor.id,
                };

                block = block.push(
                    column![
                        row![
                            text_input("Tên tầng...", &floor.name)
                                .width(Length::Fixed(200.0))
                                .on_input(move |v| Message::FloorRenamed(path, v)),
                            iced::widget::horizontal_space(),
                            button(text("Xóa tầng").size(10))
                                .style(button::text)
                                .on_press(Message::FloorRemoved(path)),
                        ]
                        .align_y(Alignment::Center),
                        ui::editor::floor_plan_editor(
                            floor,
                            path,
                            self.sessions.get(&floor.id),
                            self.armed_tool,
                            self.toolbox_drag.is_some(),
                        ),
                    ]
                    .spacing(10),
                );
            }

            body = body.push(container(block).padding(16).width(Length::Fill));
        }

        body.into()
    }

    fn residents_section(&self) -> Element<Message> {
        let counter = |label: &'static str, icon: &'static str, field: ResidentField| {
            column![
                text(icon).size(18).shaping(text::Shaping::Advanced),
                text(label).size(10).shaping(text::Shaping::Advanced),
                row![
                    button(text("-").size(12)).on_press(Message::ResidentDecremented(field)),
                    text(self.info.residents.get(field).to_string()).size(16),
                    button(text("+").size(12)).on_press(Message::ResidentIncremented(field)),
                ]
                .spacing(10)
                .align_y(Alignment::Center),
            ]
            .spacing(4)
            .align_x(Alignment::Center)
        };

        section(
            "👥 Nhân khẩu",
            row![
                counter("Người già", "👵", ResidentField::Elderly),
                counter("Trẻ nhỏ", "👶", ResidentField::Children),
                counter("Khó vận động", "♿", ResidentField::MobilityImpaired),
                counter("Tổng số người", "👤", ResidentField::Adults),
            ]
            .spacing(24)
            .into(),
        )
    }

    fn descriptions_section(&self) -> Element<Message> {
        section(
            "🧯 Thiết bị PCCC & Cảnh báo",
            column![
                text_input(
                    "Ví dụ: 3 bình ABC ở chân cầu thang, 1 thang dây ban công tầng 2...",
                    &self.info.fire_equipment,
                )
                .on_input(Message::FireEquipmentChanged),
                text_input(
                    "Khu vực nguy hiểm cháy nổ (bếp gas, kho hóa chất...)",
                    &self.info.hazards,
                )
                .on_input(Message::HazardsChanged),
                text_input(
                    "Điểm tập kết an toàn khi thoát nạn...",
                    &self.info.assembly_point,
                )
                .on_input(Message::AssemblyPointChanged),
            ]
            .spacing(12)
            .into(),
        )
    }

    fn submit_section(&self) -> Element<Message> {
        column![
            button(
                text(if self.generating_brief {
                    "Đang phân tích dữ liệu..."
                } else {
                    "🚀 GỬI THÔNG TIN KHẨN CẤP"
                })
                .size(18)
                .shaping(text::Shaping::Advanced),
            )
            .width(Length::Fill)
            .padding(20)
            .on_press_maybe((!self.generating_brief).then_some(Message::SubmitRequested)),
            text("Dữ liệu của bạn được mã hóa và gửi trực tiếp đến hệ thống chỉ huy 114.")
                .size(10)
                .shaping(text::Shaping::Advanced),
        ]
        .spacing(10)
        .align_x(Alignment::Center)
        .into()
    }

    fn success_view<'a>(&self, brief_text: &'a str) -> Element<'a, Message> {
        let card = column![
            text("✓ GỬI THÀNH CÔNG").size(24),
            text(
                "Cán bộ PCCC sẽ sớm liên hệ qua điện thoại để xác minh và hỗ trợ \
                 phương án đảm bảo an toàn cho cơ sở của bạn.",
            )
            .size(13)
            .shaping(text::Shaping::Advanced),
            text("Chỉ thị cứu hộ:").size(12).shaping(text::Shaping::Advanced),
            scrollable(text(brief_text).size(12).shaping(text::Shaping::Advanced))
                .height(Length::Fixed(260.0)),
            button(text("Đã hiểu").size(13))
                .width(Length::Fill)
                .on_press(Message::SuccessDismissed),
        ]
        .spacing(16)
        .max_width(520);

        container(card)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    /// A chip drag can end anywhere on the window. A left-button release
    /// that no widget consumed still clears the pending drag, so it cannot
    /// go stale and turn a later canvas click into a drop.
    fn subscription(&self) -> Subscription<Message> {
        event::listen_with(|event, status, _window| match (event, status) {
            (
                Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)),
                event::Status::Ignored,
            ) => Some(Message::DragReleased),
            _ => None,
        })
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Light
    }
}

/// Uniform card wrapper for a form step.
fn section<'a>(title: &'a str, body: Element<'a, Message>) -> Element<'a, Message> {
    container(
        column![
            text(title).size(15).shaping(text::Shaping::Advanced),
            body
        ]
        .spacing(12),
    )
    .padding(20)
    .width(Length::Fill)
    .into()
}

fn labeled_value<'a>(label: &'a str, value: String) -> Element<'a, Message> {
    container(
        column![
            text(label).size(9).shaping(text::Shaping::Advanced),
            text(value).size(14)
        ]
        .spacing(2)
        .align_x(Alignment::Center),
    )
    .padding(10)
    .width(Length::Fill)
    .center_x(Length::Fill)
    .into()
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "firesafe_connect=info".into()),
        )
        .init();

    iced::application("FireSafe Connect", FireSafe::update, FireSafe::view)
        .subscription(FireSafe::subscription)
        .theme(FireSafe::theme)
        .centered()
        .run_with(FireSafe::new)
}
