//! Keeps a transform gizmo bound to the current selection

use std::cell::RefCell;
use std::rc::Rc;

use shared::GizmoSubElements;

use crate::state::scene::{ListenerHandle, SceneObject, SceneRegistry};
use crate::viewport::gizmo::{GizmoOwner, ManipulatorHost, ManipulatorId, TransformProxy};

/// Pick the gizmo handles that are legal for a selection of `selection_len` objects.
/// Non-uniform scaling is never offered for multi-object selections.
pub fn choose_sub_elements(
    allow_scaling: bool,
    allow_non_uniform_scaling: bool,
    selection_len: usize,
) -> GizmoSubElements {
    if !allow_scaling {
        GizmoSubElements::TranslateRotate
    } else if !allow_non_uniform_scaling || selection_len > 1 {
        GizmoSubElements::TranslateRotateUniformScale
    } else {
        GizmoSubElements::FullTranslateRotateScale
    }
}

struct BinderState {
    owner: GizmoOwner,
    host: Rc<RefCell<dyn ManipulatorHost>>,
    enabled: Box<dyn Fn() -> bool>,
    allow_scaling: bool,
    allow_non_uniform_scaling: bool,
    active_manipulator: Option<ManipulatorId>,
    active_proxy: Option<Rc<TransformProxy>>,
}

impl BinderState {
    /// Tear down and, if the selection allows it, rebuild the gizmo from scratch
    fn update_targets(&mut self, selection: &[Rc<SceneObject>]) {
        self.host.borrow_mut().destroy_all_owned_by(self.owner);
        self.active_manipulator = None;
        self.active_proxy = None;

        if selection.is_empty() || !(self.enabled)() {
            return;
        }

        let mut proxy = TransformProxy::new();
        for object in selection {
            proxy.add_object(object);
        }
        let proxy = Rc::new(proxy);

        let elements = choose_sub_elements(
            self.allow_scaling,
            self.allow_non_uniform_scaling,
            selection.len(),
        );

        let mut host = self.host.borrow_mut();
        let manipulator = host.create_manipulator(elements, self.owner);
        host.set_target(manipulator, proxy.clone());

        self.active_manipulator = Some(manipulator);
        self.active_proxy = Some(proxy);
    }
}

/// Observes selection changes and keeps one transform gizmo on the selected objects
pub struct GizmoBinder {
    state: Rc<RefCell<BinderState>>,
    listener: Option<ListenerHandle>,
}

impl GizmoBinder {
    pub fn new(host: Rc<RefCell<dyn ManipulatorHost>>, owner: GizmoOwner) -> Self {
        Self {
            state: Rc::new(RefCell::new(BinderState {
                owner,
                host,
                enabled: Box::new(|| true),
                allow_scaling: true,
                allow_non_uniform_scaling: true,
                active_manipulator: None,
                active_proxy: None,
            })),
            listener: None,
        }
    }

    /// Subscribe to the registry's selection changes and bind to the current selection.
    /// `enabled` is consulted on every rebuild; while it returns false no gizmo is shown.
    pub fn initialize(&mut self, registry: &mut SceneRegistry, enabled: impl Fn() -> bool + 'static) {
        if let Some(handle) = self.listener.take() {
            registry.remove_selection_listener(handle);
        }

        self.state.borrow_mut().enabled = Box::new(enabled);

        let state = self.state.clone();
        self.listener = Some(registry.on_selection_modified(move |registry| {
            state.borrow_mut().update_targets(registry.selection());
        }));

        self.state.borrow_mut().update_targets(registry.selection());
    }

    /// Unsubscribe and tear down any active gizmo
    pub fn shutdown(&mut self, registry: &mut SceneRegistry) {
        if let Some(handle) = self.listener.take() {
            registry.remove_selection_listener(handle);
        }
        self.state.borrow_mut().update_targets(&[]);
    }

    pub fn set_enable_scaling(&mut self, registry: &SceneRegistry, enable: bool) {
        if self.state.borrow().allow_scaling == enable {
            return;
        }
        self.state.borrow_mut().allow_scaling = enable;
        self.force_update(registry);
    }

    pub fn set_enable_non_uniform_scaling(&mut self, registry: &SceneRegistry, enable: bool) {
        if self.state.borrow().allow_non_uniform_scaling == enable {
            return;
        }
        self.state.borrow_mut().allow_non_uniform_scaling = enable;
        self.force_update(registry);
    }

    /// Rebuild against the registry's current selection
    pub fn force_update(&self, registry: &SceneRegistry) {
        self.state.borrow_mut().update_targets(registry.selection());
    }

    pub fn is_initialized(&self) -> bool {
        self.listener.is_some()
    }

    pub fn owner(&self) -> GizmoOwner {
        self.state.borrow().owner
    }

    pub fn active_manipulator(&self) -> Option<ManipulatorId> {
        self.state.borrow().active_manipulator
    }

    pub fn active_proxy(&self) -> Option<Rc<TransformProxy>> {
        self.state.borrow().active_proxy.clone()
    }

    pub fn scaling_enabled(&self) -> bool {
        self.state.borrow().allow_scaling
    }

    pub fn non_uniform_scaling_enabled(&self) -> bool {
        self.state.borrow().allow_non_uniform_scaling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::scene::SceneObjectDesc;
    use crate::viewport::gizmo::GizmoManager;
    use crate::viewport::mesh;
    use std::cell::Cell;

    fn setup() -> (SceneRegistry, Rc<RefCell<GizmoManager>>, GizmoBinder) {
        let registry = SceneRegistry::default();
        let host = Rc::new(RefCell::new(GizmoManager::new()));
        let binder = GizmoBinder::new(host.clone(), GizmoOwner(7));
        (registry, host, binder)
    }

    fn add(r: &mut SceneRegistry, name: &str) -> Rc<SceneObject> {
        r.create_object(SceneObjectDesc::new(name, mesh::cube(1.0, 1.0, 1.0, [1.0; 3])))
    }

    #[test]
    fn test_choose_sub_elements_precedence() {
        use GizmoSubElements::*;
        assert_eq!(choose_sub_elements(false, true, 1), TranslateRotate);
        assert_eq!(choose_sub_elements(false, false, 3), TranslateRotate);
        assert_eq!(choose_sub_elements(true, false, 1), TranslateRotateUniformScale);
        assert_eq!(choose_sub_elements(true, true, 2), TranslateRotateUniformScale);
        assert_eq!(choose_sub_elements(true, true, 1), FullTranslateRotateScale);
    }

    #[test]
    fn test_initialize_with_empty_selection_creates_nothing() {
        let (mut r, host, mut binder) = setup();
        binder.initialize(&mut r, || true);
        assert!(binder.is_initialized());
        assert!(binder.active_manipulator().is_none());
        assert!(host.borrow().manipulators().is_empty());
    }

    #[test]
    fn test_initialize_after_selection_binds_immediately() {
        let (mut r, host, mut binder) = setup();
        let a = add(&mut r, "a");
        r.set_selected(&a, false, false);

        binder.initialize(&mut r, || true);
        assert!(binder.active_manipulator().is_some());
        assert_eq!(host.borrow().manipulators().len(), 1);
    }

    #[test]
    fn test_selection_change_rebuilds_single_manipulator() {
        let (mut r, host, mut binder) = setup();
        binder.initialize(&mut r, || true);
        let a = add(&mut r, "a");
        let b = add(&mut r, "b");

        r.set_selected(&a, false, false);
        let first = binder.active_manipulator().unwrap();
        r.set_selected(&b, false, false);
        let second = binder.active_manipulator().unwrap();

        assert_ne!(first, second);
        assert_eq!(host.borrow().manipulators().len(), 1);
        assert_eq!(binder.active_proxy().unwrap().len(), 2);
    }

    #[test]
    fn test_disabled_callback_suppresses_gizmo() {
        let (mut r, host, mut binder) = setup();
        let enabled = Rc::new(Cell::new(false));
        let e = enabled.clone();
        binder.initialize(&mut r, move || e.get());

        let a = add(&mut r, "a");
        r.set_selected(&a, false, false);
        assert!(binder.active_manipulator().is_none());

        enabled.set(true);
        binder.force_update(&r);
        assert!(binder.active_manipulator().is_some());
        assert_eq!(host.borrow().manipulators().len(), 1);
    }

    #[test]
    fn test_flag_change_forces_rebuild() {
        let (mut r, host, mut binder) = setup();
        binder.initialize(&mut r, || true);
        let a = add(&mut r, "a");
        r.set_selected(&a, false, false);

        binder.set_enable_scaling(&r, false);
        let id = binder.active_manipulator().unwrap();
        assert_eq!(
            host.borrow().manipulator(id).unwrap().elements,
            GizmoSubElements::TranslateRotate
        );
    }

    #[test]
    fn test_same_flag_value_does_not_rebuild() {
        let (mut r, _host, mut binder) = setup();
        binder.initialize(&mut r, || true);
        let a = add(&mut r, "a");
        r.set_selected(&a, false, false);

        let before = binder.active_manipulator();
        binder.set_enable_scaling(&r, true);
        binder.set_enable_non_uniform_scaling(&r, true);
        assert_eq!(binder.active_manipulator(), before);
    }

    #[test]
    fn test_shutdown_tears_down_and_unsubscribes() {
        let (mut r, host, mut binder) = setup();
        binder.initialize(&mut r, || true);
        let a = add(&mut r, "a");
        r.set_selected(&a, false, false);

        binder.shutdown(&mut r);
        assert!(!binder.is_initialized());
        assert!(binder.active_manipulator().is_none());
        assert!(host.borrow().manipulators().is_empty());
        assert_eq!(r.listener_count(), 0);

        r.clear_selection();
        let b = add(&mut r, "b");
        r.set_selected(&b, false, false);
        assert!(host.borrow().manipulators().is_empty());
    }

    #[test]
    fn test_reinitialize_does_not_double_subscribe() {
        let (mut r, _host, mut binder) = setup();
        binder.initialize(&mut r, || true);
        binder.initialize(&mut r, || true);
        assert_eq!(r.listener_count(), 1);
    }
}
