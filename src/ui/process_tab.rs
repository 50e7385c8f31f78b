use gtk4 as gtk;
use gtk::prelude::*;
use gtk::glib;
use gtk::gio;
use gtk::subclass::prelude::ObjectSubclassIsExt;
use nix::sys::signal::Signal;
use std::cell::{Ref, RefCell};
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;

use crate::backend::{signal, CollectorHandle};
use crate::model::{ProcessNode, ProcessRecord, SortColumn, SystemSnapshot, UiState};
use crate::util;

// GObject wrapper for one tree node
mod imp {
    use super::*;
    use gtk::glib;
    use gtk::subclass::prelude::*;
    use std::cell::RefCell;

    #[derive(Default)]
    pub struct ProcessObject {
        pub record: RefCell<ProcessRecord>,
        pub children: RefCell<Option<gio::ListStore>>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for ProcessObject {
        const NAME: &'static str = "ProcessExplorerProcessObject";
        type Type = super::ProcessObject;
        type ParentType = glib::Object;
    }

    impl ObjectImpl for ProcessObject {}
}

glib::wrapper! {
    pub struct ProcessObject(ObjectSubclass<imp::ProcessObject>);
}

impl ProcessObject {
    pub fn from_node(node: &ProcessNode) -> Self {
        let obj: Self = glib::Object::builder().build();
        *obj.imp().record.borrow_mut() = node.record.clone();
        if !node.children.is_empty() {
            let store = gio::ListStore::new::<ProcessObject>();
            let kids: Vec<ProcessObject> = node.children.iter().map(ProcessObject::from_node).collect();
            store.extend_from_slice(&kids);
            *obj.imp().children.borrow_mut() = Some(store);
        }
        obj
    }

    pub fn record(&self) -> Ref<'_, ProcessRecord> {
        self.imp().record.borrow()
    }

    pub fn pid(&self) -> i32 {
        self.record().pid
    }

    pub fn children(&self) -> Option<gio::ListStore> {
        self.imp().children.borrow().clone()
    }
}

fn row_object(item: Option<glib::Object>) -> Option<ProcessObject> {
    item.and_downcast::<gtk::TreeListRow>()
        .and_then(|row| row.item())
        .and_downcast::<ProcessObject>()
}

pub fn cell_text(record: &ProcessRecord, column: SortColumn) -> String {
    match column {
        SortColumn::Pid => record.pid.to_string(),
        SortColumn::Name => record.name.clone(),
        SortColumn::User => record.user.clone(),
        SortColumn::Cpu => format!("{:.1}", record.cpu_percent),
        SortColumn::Memory => format!("{:.1}", record.memory_percent),
        SortColumn::Rss => util::format_mib(record.rss_bytes),
        SortColumn::Status => record.status.clone(),
    }
}

fn level_class(percent: f64) -> Option<&'static str> {
    if percent > 90.0 {
        Some("resource-critical")
    } else if percent > 50.0 {
        Some("resource-high")
    } else if percent > 20.0 {
        Some("resource-medium")
    } else {
        None
    }
}

pub struct ProcessTab {
    pub widget: gtk::Box,
    store: gio::ListStore,
    selection: gtk::MultiSelection,
    sort_model: gtk::SortListModel,
    scroll: gtk::ScrolledWindow,
    stats_label: gtk::Label,
    state: Rc<RefCell<UiState>>,
}

impl ProcessTab {
    pub fn new(collector: CollectorHandle, signal_refresh_delay: Duration) -> Self {
        let widget = gtk::Box::new(gtk::Orientation::Vertical, 0);
        widget.add_css_class("process-view");

        let state = Rc::new(RefCell::new(UiState::default()));

        // Toolbar
        let toolbar = gtk::Box::new(gtk::Orientation::Horizontal, 8);
        toolbar.add_css_class("toolbar-row");

        let search_entry = gtk::SearchEntry::new();
        search_entry.set_placeholder_text(Some("Search processes..."));
        search_entry.set_hexpand(true);
        toolbar.append(&search_entry);

        let kill_button = gtk::Button::with_label("Kill");
        kill_button.add_css_class("destructive-action");
        toolbar.append(&kill_button);

        let term_button = gtk::Button::with_label("SIGTERM");
        toolbar.append(&term_button);

        let auto_button = gtk::ToggleButton::with_label("Auto-refresh");
        auto_button.set_active(state.borrow().auto_refresh_enabled);
        toolbar.append(&auto_button);

        let refresh_button = gtk::Button::from_icon_name("view-refresh-symbolic");
        refresh_button.set_tooltip_text(Some("Refresh now"));
        toolbar.append(&refresh_button);

        widget.append(&toolbar);

        let stats_label = gtk::Label::new(None);
        stats_label.set_xalign(0.0);
        stats_label.add_css_class("dim-label");
        stats_label.add_css_class("stats-line");
        widget.append(&stats_label);

        // Root store; children hang off each ProcessObject
        let store = gio::ListStore::new::<ProcessObject>();
        let tree_model = gtk::TreeListModel::new(
            store.clone(),
            false, // passthrough
            true,  // autoexpand
            |obj| {
                let proc_obj = obj.downcast_ref::<ProcessObject>()?;
                proc_obj.children().map(|s| s.upcast::<gio::ListModel>())
            },
        );

        let filter_state = state.clone();
        let filter = gtk::CustomFilter::new(move |obj| {
            row_object(Some(obj.clone()))
                .map_or(true, |proc_obj| proc_obj.record().matches(&filter_state.borrow().search_text))
        });
        let filter_model = gtk::FilterListModel::new(Some(tree_model), Some(filter.clone()));

        let search_state = state.clone();
        search_entry.connect_search_changed(move |entry| {
            search_state.borrow_mut().search_text = entry.text().to_string();
            filter.changed(gtk::FilterChange::Different);
        });

        let sort_model = gtk::SortListModel::new(Some(filter_model), None::<gtk::Sorter>);
        let selection = gtk::MultiSelection::new(Some(sort_model.clone()));

        let column_view = gtk::ColumnView::new(Some(selection.clone()));
        column_view.set_show_column_separators(true);
        column_view.set_show_row_separators(false);

        let mut default_sort_column = None;
        for column in SortColumn::ALL {
            let view_column = build_column(column);
            column_view.append_column(&view_column);
            if column == state.borrow().sort_column {
                default_sort_column = Some(view_column);
            }
        }

        if let Some(cv_sorter) = column_view.sorter() {
            let tree_sorter = gtk::TreeListRowSorter::new(Some(cv_sorter.clone()));
            sort_model.set_sorter(Some(&tree_sorter));

            let sort_state = state.clone();
            cv_sorter.connect_changed(move |sorter, _| {
                let Some(sorter) = sorter.downcast_ref::<gtk::ColumnViewSorter>() else {
                    return;
                };
                let title = sorter.primary_sort_column().and_then(|c| c.title());
                let column = SortColumn::ALL
                    .into_iter()
                    .find(|c| title.as_deref() == Some(c.title()));
                if let Some(column) = column {
                    let mut state = sort_state.borrow_mut();
                    state.sort_column = column;
                    state.sort_ascending = sorter.primary_sort_order() == gtk::SortType::Ascending;
                }
            });
        }
        let default_order = if state.borrow().sort_ascending {
            gtk::SortType::Ascending
        } else {
            gtk::SortType::Descending
        };
        column_view.sort_by_column(default_sort_column.as_ref(), default_order);

        let scroll = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .hexpand(true)
            .child(&column_view)
            .build();
        widget.append(&scroll);

        // Signal buttons
        let send = {
            let selection = selection.clone();
            let collector = collector.clone();
            Rc::new(move |sig: Signal| {
                let pids = selected_pids(&selection);
                if pids.is_empty() {
                    return;
                }
                signal::send_to_all(pids, sig);
                let collector = collector.clone();
                glib::timeout_add_local_once(signal_refresh_delay, move || {
                    collector.request_refresh();
                });
            })
        };

        let send_kill = send.clone();
        kill_button.connect_clicked(move |_| send_kill(Signal::SIGKILL));
        let send_term = send.clone();
        term_button.connect_clicked(move |_| send_term(Signal::SIGTERM));

        let auto_state = state.clone();
        let auto_collector = collector.clone();
        auto_button.connect_toggled(move |button| {
            let enabled = button.is_active();
            let mut state = auto_state.borrow_mut();
            if state.auto_refresh_enabled != enabled {
                state.auto_refresh_enabled = enabled;
                auto_collector.set_auto_refresh(enabled);
            }
        });

        let refresh_collector = collector.clone();
        refresh_button.connect_clicked(move |_| refresh_collector.request_refresh());

        // Keyboard shortcuts
        let key_controller = gtk::EventControllerKey::new();
        let search_entry_clone = search_entry.clone();
        let send_delete = send.clone();
        key_controller.connect_key_pressed(move |_, key, _, modifier| {
            match (key, modifier) {
                (gtk::gdk::Key::f, gtk::gdk::ModifierType::CONTROL_MASK) => {
                    search_entry_clone.grab_focus();
                    glib::Propagation::Stop
                }
                (gtk::gdk::Key::Delete, _) => {
                    send_delete(Signal::SIGTERM);
                    glib::Propagation::Stop
                }
                _ => glib::Propagation::Proceed,
            }
        });
        widget.add_controller(key_controller);

        Self {
            widget,
            store,
            selection,
            sort_model,
            scroll,
            stats_label,
            state,
        }
    }

    /// Rebuilds the whole tree from the snapshot, keeping the selection by pid.
    pub fn update(&mut self, snapshot: &SystemSnapshot) {
        let kept: HashSet<i32> = selected_pids(&self.selection).into_iter().collect();
        self.state.borrow_mut().selected_pids = kept;

        let vadj = self.scroll.vadjustment();
        let scroll_pos = vadj.value();

        let roots: Vec<ProcessObject> = snapshot.tree.roots().iter().map(ProcessObject::from_node).collect();
        self.store.remove_all();
        self.store.extend_from_slice(&roots);

        if let Some(sorter) = self.sort_model.sorter() {
            sorter.changed(gtk::SorterChange::Different);
        }

        self.selection.unselect_all();
        let state = self.state.borrow();
        if !state.selected_pids.is_empty() {
            for position in 0..self.selection.n_items() {
                let pid = row_object(self.selection.item(position)).map(|obj| obj.pid());
                if pid.is_some_and(|pid| state.selected_pids.contains(&pid)) {
                    self.selection.select_item(position, false);
                }
            }
        }

        self.stats_label.set_text(&util::stats_line(snapshot));
        vadj.set_value(scroll_pos);
    }
}

fn selected_pids(selection: &gtk::MultiSelection) -> Vec<i32> {
    let bitset = selection.selection();
    (0..bitset.size())
        .filter_map(|i| {
            let position = bitset.nth(i as u32);
            row_object(selection.item(position)).map(|obj| obj.pid())
        })
        .collect()
}

fn build_column(column: SortColumn) -> gtk::ColumnViewColumn {
    let factory = gtk::SignalListItemFactory::new();

    factory.connect_setup(move |_, item| {
        let Some(item) = item.downcast_ref::<gtk::ListItem>() else {
            return;
        };
        let label = gtk::Label::new(None);
        if column.is_numeric() {
            label.set_xalign(1.0);
            label.add_css_class("numeric");
        } else {
            label.set_xalign(0.0);
            label.set_ellipsize(gtk::pango::EllipsizeMode::End);
        }
        label.add_css_class("monospace");

        if column == SortColumn::Name {
            let expander = gtk::TreeExpander::new();
            expander.set_child(Some(&label));
            item.set_child(Some(&expander));
        } else {
            item.set_child(Some(&label));
        }
    });

    factory.connect_bind(move |_, item| {
        let Some(item) = item.downcast_ref::<gtk::ListItem>() else {
            return;
        };
        let Some(row) = item.item().and_downcast::<gtk::TreeListRow>() else {
            return;
        };
        let Some(obj) = row.item().and_downcast::<ProcessObject>() else {
            return;
        };

        let label = if column == SortColumn::Name {
            let Some(expander) = item.child().and_downcast::<gtk::TreeExpander>() else {
                return;
            };
            expander.set_list_row(Some(&row));
            expander.child().and_downcast::<gtk::Label>()
        } else {
            item.child().and_downcast::<gtk::Label>()
        };
        let Some(label) = label else {
            return;
        };

        let record = obj.record();
        label.set_text(&cell_text(&record, column));

        label.remove_css_class("resource-medium");
        label.remove_css_class("resource-high");
        label.remove_css_class("resource-critical");
        let level = match column {
            SortColumn::Cpu => level_class(record.cpu_percent),
            SortColumn::Memory => level_class(record.memory_percent),
            _ => None,
        };
        if let Some(class) = level {
            label.add_css_class(class);
        }
    });

    if column == SortColumn::Name {
        factory.connect_unbind(|_, item| {
            let Some(item) = item.downcast_ref::<gtk::ListItem>() else {
                return;
            };
            if let Some(expander) = item.child().and_downcast::<gtk::TreeExpander>() {
                expander.set_list_row(None::<&gtk::TreeListRow>);
            }
        });
    }

    let view_column = gtk::ColumnViewColumn::new(Some(column.title()), Some(factory));
    view_column.set_resizable(true);
    match column {
        SortColumn::Name => view_column.set_expand(true),
        SortColumn::Pid => view_column.set_fixed_width(70),
        SortColumn::User => view_column.set_fixed_width(100),
        _ => view_column.set_fixed_width(80),
    }

    let sorter = gtk::CustomSorter::new(move |a, b| {
        let (Some(pa), Some(pb)) = (a.downcast_ref::<ProcessObject>(), b.downcast_ref::<ProcessObject>()) else {
            return gtk::Ordering::Equal;
        };
        column.compare(&pa.record(), &pb.record()).into()
    });
    view_column.set_sorter(Some(&sorter));
    view_column
}
