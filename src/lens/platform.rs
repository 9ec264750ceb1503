#[cfg(windows)]
pub use platform::{run, Win32Backend};

#[cfg(not(windows))]
pub fn run(_settings: &crate::settings::Settings) -> anyhow::Result<i32> {
    Err(anyhow::anyhow!(
        "the magnifier overlay needs the Windows magnification API"
    ))
}

#[cfg(windows)]
mod platform {
    use crate::hotkey::Hotkey;
    use crate::lens::backend::{
        inset_source_region, zoom_matrix, HostWindow, Magnification, TickScheduler,
    };
    use crate::lens::geometry::{ScreenMetrics, ScreenPoint, ScreenRect, DEFAULT_ZOOM};
    use crate::lens::input::{key_code_from_virtual_key, KeyEvent, KeyModifiers, MouseEvent};
    use crate::lens::messages::MagnifierEvent;
    use crate::lens::region::EllipseRegion;
    use crate::lens::runtime::MagnifierRuntime;
    use crate::settings::Settings;
    use anyhow::{anyhow, Context, Result};
    use once_cell::sync::Lazy;
    use std::cell::{Cell, RefCell};
    use std::ops::ControlFlow;
    use std::rc::Rc;
    use std::sync::mpsc::{channel, Receiver, Sender};
    use std::sync::Mutex;
    use std::time::Duration;
    use windows::core::{w, PCWSTR};
    use windows::Win32::Foundation::{COLORREF, HINSTANCE, HWND, LPARAM, LRESULT, POINT, RECT, WPARAM};
    use windows::Win32::Graphics::Gdi::{
        CreateEllipticRgn, CreateSolidBrush, DeleteObject, InvalidateRect, SetWindowRgn, HBRUSH,
        HRGN,
    };
    use windows::Win32::System::LibraryLoader::GetModuleHandleW;
    use windows::Win32::UI::Input::KeyboardAndMouse::{
        GetKeyState, RegisterHotKey, ReleaseCapture, UnregisterHotKey, HOT_KEY_MODIFIERS,
        MOD_ALT, MOD_CONTROL, MOD_NOREPEAT, MOD_SHIFT, MOD_WIN, VK_CONTROL, VK_MENU, VK_SHIFT,
    };
    use windows::Win32::UI::Magnification::{
        MagInitialize, MagSetWindowFilterList, MagSetWindowSource, MagSetWindowTransform,
        MagUninitialize, MAGTRANSFORM, MW_FILTERMODE_EXCLUDE,
    };
    use windows::Win32::UI::WindowsAndMessaging::{
        CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetCursorPos,
        GetMessageW, GetSystemMetrics, GetWindowLongPtrW, KillTimer, LoadCursorW, PostMessageW,
        PostQuitMessage, RegisterClassExW, SetLayeredWindowAttributes, SetTimer,
        SetWindowLongPtrW, SetWindowPos, ShowWindow, TranslateMessage, UnregisterClassW,
        CS_DBLCLKS, CS_HREDRAW, CS_VREDRAW, GWL_EXSTYLE, GWL_STYLE, HTCAPTION, HWND_TOPMOST,
        IDC_ARROW, LWA_ALPHA, MSG, SC_MOVE, SM_CXSCREEN, SM_CYSCREEN, SWP_NOACTIVATE,
        SWP_NOMOVE, SWP_NOSIZE, SWP_NOZORDER, SW_MINIMIZE, SW_RESTORE, SW_SHOW,
        WINDOW_EX_STYLE, WINDOW_LONG_PTR_INDEX, WM_DESTROY, WM_ENTERSIZEMOVE, WM_EXITSIZEMOVE,
        WM_HOTKEY, WM_KEYDOWN, WM_LBUTTONDBLCLK, WM_LBUTTONDOWN, WM_MBUTTONUP, WM_MOVE,
        WM_RBUTTONDBLCLK, WM_SYSCOMMAND, WM_TIMER, WNDCLASSEXW, WS_CHILD, WS_CLIPCHILDREN,
        WS_DISABLED, WS_EX_LAYERED, WS_EX_TOPMOST, WS_EX_TRANSPARENT, WS_POPUP, WS_VISIBLE,
    };

    const HOST_CLASS: PCWSTR = w!("MagnifierLensHost");
    const MAGNIFIER_CLASS: PCWSTR = w!("Magnifier");
    const TIMER_ID: usize = 1;
    const HOTKEY_ID: i32 = 1;
    const MS_SHOWMAGNIFIEDCURSOR: isize = 0x0001;

    static EVENT_SENDER: Lazy<Mutex<Option<Sender<MagnifierEvent>>>> =
        Lazy::new(|| Mutex::new(None));

    thread_local! {
        static IN_MOVE_LOOP: Cell<bool> = const { Cell::new(false) };
        static MODAL_PUMP: RefCell<Option<Box<dyn FnMut()>>> = RefCell::new(None);
    }

    fn post_event(event: MagnifierEvent) {
        if let Ok(guard) = EVENT_SENDER.lock() {
            if let Some(sender) = guard.as_ref() {
                let _ = sender.send(event);
            }
        }
    }

    fn colorref(rgb: [u8; 3]) -> COLORREF {
        COLORREF((rgb[0] as u32) | ((rgb[1] as u32) << 8) | ((rgb[2] as u32) << 16))
    }

    fn hotkey_modifiers(hotkey: &Hotkey) -> HOT_KEY_MODIFIERS {
        let mut modifiers = MOD_NOREPEAT;
        if hotkey.ctrl {
            modifiers |= MOD_CONTROL;
        }
        if hotkey.alt {
            modifiers |= MOD_ALT;
        }
        if hotkey.shift {
            modifiers |= MOD_SHIFT;
        }
        if hotkey.win {
            modifiers |= MOD_WIN;
        }
        modifiers
    }

    fn key_modifiers_snapshot() -> KeyModifiers {
        let down = |vk: u16| unsafe { GetKeyState(vk as i32) } < 0;
        KeyModifiers {
            ctrl: down(VK_CONTROL.0),
            shift: down(VK_SHIFT.0),
            alt: down(VK_MENU.0),
        }
    }

    fn cursor_position() -> Option<ScreenPoint> {
        let mut point = POINT::default();
        unsafe { GetCursorPos(&mut point) }
            .ok()
            .map(|_| ScreenPoint::new(point.x, point.y))
    }

    fn signed_words(lparam: LPARAM) -> (i32, i32) {
        let x = (lparam.0 & 0xffff) as i16 as i32;
        let y = ((lparam.0 >> 16) & 0xffff) as i16 as i32;
        (x, y)
    }

    unsafe extern "system" fn host_wndproc(
        hwnd: HWND,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        match msg {
            WM_KEYDOWN => {
                post_event(MagnifierEvent::Key(KeyEvent {
                    key: key_code_from_virtual_key(wparam.0 as u32),
                    modifiers: key_modifiers_snapshot(),
                }));
                LRESULT(0)
            }
            WM_LBUTTONDOWN => {
                post_event(MagnifierEvent::Mouse(MouseEvent::LeftDown));
                LRESULT(0)
            }
            WM_LBUTTONDBLCLK => {
                post_event(MagnifierEvent::Mouse(MouseEvent::LeftDoubleClick));
                LRESULT(0)
            }
            WM_RBUTTONDBLCLK => {
                post_event(MagnifierEvent::Mouse(MouseEvent::RightDoubleClick));
                LRESULT(0)
            }
            WM_MBUTTONUP => {
                post_event(MagnifierEvent::Mouse(MouseEvent::MiddleClick));
                LRESULT(0)
            }
            WM_HOTKEY => {
                if wparam.0 as i32 == HOTKEY_ID {
                    post_event(MagnifierEvent::Hotkey);
                }
                LRESULT(0)
            }
            WM_MOVE => {
                // Popup windows have no frame, so the client origin is the window origin.
                let (x, y) = signed_words(lparam);
                post_event(MagnifierEvent::Moved {
                    position: ScreenPoint::new(x, y),
                });
                LRESULT(0)
            }
            WM_TIMER => {
                if wparam.0 == TIMER_ID {
                    post_event(MagnifierEvent::Tick {
                        cursor: cursor_position(),
                    });
                    // The OS move-loop starves the main loop; drive the lens from here meanwhile.
                    if IN_MOVE_LOOP.with(Cell::get) {
                        MODAL_PUMP.with(|pump| {
                            if let Ok(mut pump) = pump.try_borrow_mut() {
                                if let Some(pump) = pump.as_mut() {
                                    pump();
                                }
                            }
                        });
                    }
                }
                LRESULT(0)
            }
            WM_ENTERSIZEMOVE => {
                IN_MOVE_LOOP.with(|flag| flag.set(true));
                LRESULT(0)
            }
            WM_EXITSIZEMOVE => {
                IN_MOVE_LOOP.with(|flag| flag.set(false));
                LRESULT(0)
            }
            WM_DESTROY => {
                post_event(MagnifierEvent::CloseRequested);
                LRESULT(0)
            }
            _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
        }
    }

    #[derive(Debug)]
    pub struct Win32Backend {
        hinstance: HINSTANCE,
        host: HWND,
        display: HWND,
        border_brush: HBRUSH,
        border_color: [u8; 3],
        hotkey: Hotkey,
        hotkey_registered: bool,
        class_registered: bool,
        timer_running: bool,
        display_inset: i32,
        zoom: f32,
    }

    impl Win32Backend {
        pub fn new(settings: &Settings) -> Result<Self> {
            let module = unsafe { GetModuleHandleW(PCWSTR::null()) }
                .context("failed to resolve the module handle")?;
            Ok(Self {
                hinstance: module.into(),
                host: HWND::default(),
                display: HWND::default(),
                border_brush: HBRUSH::default(),
                border_color: settings.border_color,
                hotkey: settings.hotkey(),
                hotkey_registered: false,
                class_registered: false,
                timer_running: false,
                display_inset: 0,
                zoom: DEFAULT_ZOOM,
            })
        }

        fn register_class(&mut self) -> Result<()> {
            if self.class_registered {
                return Ok(());
            }
            let border_brush = unsafe { CreateSolidBrush(colorref(self.border_color)) };
            let cursor = unsafe { LoadCursorW(None, IDC_ARROW) }.unwrap_or_default();
            let class = WNDCLASSEXW {
                cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
                style: CS_HREDRAW | CS_VREDRAW | CS_DBLCLKS,
                lpfnWndProc: Some(host_wndproc),
                hInstance: self.hinstance,
                hCursor: cursor,
                hbrBackground: border_brush,
                lpszClassName: HOST_CLASS,
                ..Default::default()
            };
            if unsafe { RegisterClassExW(&class) } == 0 {
                unsafe {
                    let _ = DeleteObject(border_brush);
                }
                return Err(anyhow!(windows::core::Error::from_win32()))
                    .context("failed to register the host window class");
            }
            self.border_brush = border_brush;
            self.class_registered = true;
            Ok(())
        }

        fn create_windows(&mut self, bounds: ScreenRect) -> Result<()> {
            self.register_class()?;

            self.host = unsafe {
                CreateWindowExW(
                    WS_EX_TOPMOST | WS_EX_LAYERED,
                    HOST_CLASS,
                    w!("Magnifier"),
                    WS_CLIPCHILDREN | WS_POPUP,
                    bounds.x,
                    bounds.y,
                    bounds.width,
                    bounds.height,
                    None,
                    None,
                    self.hinstance,
                    None,
                )
            }
            .context("failed to create the host window")?;

            unsafe { SetLayeredWindowAttributes(self.host, COLORREF(0), 255, LWA_ALPHA) }
                .context("failed to make the host window opaque")?;

            // Disabled so mouse input falls through to the host.
            self.display = unsafe {
                CreateWindowExW(
                    WINDOW_EX_STYLE(0),
                    MAGNIFIER_CLASS,
                    w!("MagnifierDisplay"),
                    WS_CHILD | WS_VISIBLE | WS_DISABLED,
                    0,
                    0,
                    bounds.width,
                    bounds.height,
                    self.host,
                    None,
                    self.hinstance,
                    None,
                )
            }
            .context("failed to create the magnifier display surface")?;

            let mut excluded = [self.host];
            if !unsafe {
                MagSetWindowFilterList(
                    self.display,
                    MW_FILTERMODE_EXCLUDE,
                    excluded.len() as i32,
                    excluded.as_mut_ptr(),
                )
            }
            .as_bool()
            {
                tracing::warn!("failed to exclude the lens from its own capture");
            }

            self.register_hotkey();
            Ok(())
        }

        fn register_hotkey(&mut self) {
            let result = unsafe {
                RegisterHotKey(
                    self.host,
                    HOTKEY_ID,
                    hotkey_modifiers(&self.hotkey),
                    self.hotkey.key,
                )
            };
            match result {
                Ok(()) => {
                    self.hotkey_registered = true;
                    tracing::info!(hotkey = %self.hotkey, "registered minimize hotkey");
                }
                Err(err) => {
                    tracing::warn!(
                        hotkey = %self.hotkey,
                        error = %err,
                        "failed to register minimize hotkey"
                    );
                }
            }
        }

        fn apply_region(hwnd: HWND, clip: Option<EllipseRegion>) -> Result<()> {
            let region = match clip {
                Some(clip) => unsafe {
                    CreateEllipticRgn(clip.left, clip.top, clip.right, clip.bottom)
                },
                None => HRGN::default(),
            };
            if clip.is_some() && region.is_invalid() {
                return Err(anyhow!("failed to create elliptic region"));
            }
            // On success the window owns the region.
            if unsafe { SetWindowRgn(hwnd, region, true) } == 0 {
                if !region.is_invalid() {
                    unsafe {
                        let _ = DeleteObject(region);
                    }
                }
                return Err(anyhow!("failed to apply window region"));
            }
            Ok(())
        }

        fn update_style(hwnd: HWND, index: WINDOW_LONG_PTR_INDEX, flag: isize, enabled: bool) {
            unsafe {
                let style = GetWindowLongPtrW(hwnd, index);
                let next = if enabled { style | flag } else { style & !flag };
                if next != style {
                    SetWindowLongPtrW(hwnd, index, next);
                }
            }
        }
    }

    impl Magnification for Win32Backend {
        fn initialize(&mut self) -> Result<()> {
            if unsafe { MagInitialize() }.as_bool() {
                Ok(())
            } else {
                Err(anyhow!("MagInitialize returned FALSE"))
            }
        }

        fn set_zoom_transform(&mut self, factor: f32) -> Result<()> {
            let mut transform = MAGTRANSFORM {
                v: zoom_matrix(factor),
            };
            if unsafe { MagSetWindowTransform(self.display, &mut transform) }.as_bool() {
                self.zoom = factor;
                Ok(())
            } else {
                Err(anyhow!("MagSetWindowTransform rejected factor {factor}"))
            }
        }

        fn set_source_region(&mut self, rect: ScreenRect) -> Result<()> {
            let rect = inset_source_region(rect, self.display_inset, self.zoom);
            let source = RECT {
                left: rect.x,
                top: rect.y,
                right: rect.right(),
                bottom: rect.bottom(),
            };
            let applied = unsafe { MagSetWindowSource(self.display, source) }.as_bool();
            unsafe {
                let _ = InvalidateRect(self.display, None, true);
            }
            if applied {
                Ok(())
            } else {
                Err(anyhow!("MagSetWindowSource failed"))
            }
        }

        fn teardown(&mut self) {
            if !unsafe { MagUninitialize() }.as_bool() {
                tracing::warn!("MagUninitialize returned FALSE");
            }
        }
    }

    impl HostWindow for Win32Backend {
        fn screen_metrics(&self) -> ScreenMetrics {
            let (width, height) =
                unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
            ScreenMetrics::new(width, height)
        }

        fn create(&mut self, bounds: ScreenRect) -> Result<()> {
            let created = self.create_windows(bounds);
            if created.is_err() {
                self.destroy();
            }
            created
        }

        fn destroy(&mut self) {
            unsafe {
                if self.hotkey_registered {
                    let _ = UnregisterHotKey(self.host, HOTKEY_ID);
                    self.hotkey_registered = false;
                }
                if !self.host.is_invalid() {
                    // Destroys the display surface with it.
                    let _ = DestroyWindow(self.host);
                    self.host = HWND::default();
                    self.display = HWND::default();
                }
                if self.class_registered {
                    let _ = UnregisterClassW(HOST_CLASS, self.hinstance);
                    self.class_registered = false;
                }
                if !self.border_brush.is_invalid() {
                    let _ = DeleteObject(self.border_brush);
                    self.border_brush = HBRUSH::default();
                }
            }
        }

        fn show(&mut self) {
            unsafe {
                let _ = ShowWindow(self.host, SW_SHOW);
            }
        }

        fn set_bounds(&mut self, bounds: ScreenRect) -> Result<()> {
            unsafe {
                SetWindowPos(
                    self.host,
                    HWND_TOPMOST,
                    bounds.x,
                    bounds.y,
                    bounds.width,
                    bounds.height,
                    SWP_NOACTIVATE,
                )
            }?;
            Ok(())
        }

        fn move_to(&mut self, position: ScreenPoint) -> Result<()> {
            unsafe {
                SetWindowPos(
                    self.host,
                    HWND_TOPMOST,
                    position.x,
                    position.y,
                    0,
                    0,
                    SWP_NOACTIVATE | SWP_NOSIZE,
                )
            }?;
            Ok(())
        }

        fn set_clip(&mut self, clip: EllipseRegion) -> Result<()> {
            Self::apply_region(self.host, Some(clip))
        }

        fn set_display_bounds(&mut self, bounds: ScreenRect) -> Result<()> {
            unsafe {
                SetWindowPos(
                    self.display,
                    HWND::default(),
                    bounds.x,
                    bounds.y,
                    bounds.width,
                    bounds.height,
                    SWP_NOZORDER | SWP_NOACTIVATE,
                )
            }?;
            self.display_inset = bounds.x;
            Ok(())
        }

        fn set_display_clip(&mut self, clip: Option<EllipseRegion>) -> Result<()> {
            Self::apply_region(self.display, clip)
        }

        fn assert_topmost(&mut self) -> Result<()> {
            unsafe {
                SetWindowPos(
                    self.host,
                    HWND_TOPMOST,
                    0,
                    0,
                    0,
                    0,
                    SWP_NOACTIVATE | SWP_NOMOVE | SWP_NOSIZE,
                )
            }?;
            Ok(())
        }

        fn request_repaint(&mut self) {
            unsafe {
                let _ = InvalidateRect(self.host, None, true);
            }
        }

        fn set_cursor_visible(&mut self, visible: bool) -> Result<()> {
            Self::update_style(self.display, GWL_STYLE, MS_SHOWMAGNIFIEDCURSOR, visible);
            Ok(())
        }

        fn set_click_through(&mut self, enabled: bool) -> Result<()> {
            Self::update_style(
                self.host,
                GWL_EXSTYLE,
                WS_EX_TRANSPARENT.0 as isize,
                enabled,
            );
            Ok(())
        }

        fn begin_drag(&mut self) {
            // Posted so the move-loop runs from the main loop rather than inside an effect.
            unsafe {
                let _ = ReleaseCapture();
                let _ = PostMessageW(
                    self.host,
                    WM_SYSCOMMAND,
                    WPARAM((SC_MOVE | HTCAPTION) as usize),
                    LPARAM(0),
                );
            }
        }

        fn set_minimized(&mut self, minimized: bool) {
            let command = if minimized { SW_MINIMIZE } else { SW_RESTORE };
            unsafe {
                let _ = ShowWindow(self.host, command);
            }
        }
    }

    impl TickScheduler for Win32Backend {
        fn start(&mut self, period: Duration) -> Result<()> {
            let millis = u32::try_from(period.as_millis()).unwrap_or(u32::MAX).max(1);
            if unsafe { SetTimer(self.host, TIMER_ID, millis, None) } == 0 {
                return Err(anyhow!(windows::core::Error::from_win32()));
            }
            self.timer_running = true;
            Ok(())
        }

        fn stop(&mut self) {
            if self.timer_running {
                unsafe {
                    let _ = KillTimer(self.host, TIMER_ID);
                }
                self.timer_running = false;
            }
        }
    }

    type SharedRuntime = Rc<RefCell<MagnifierRuntime<Win32Backend>>>;

    fn drain_events(
        runtime: &RefCell<MagnifierRuntime<Win32Backend>>,
        events: &Receiver<MagnifierEvent>,
        exit: &Cell<Option<i32>>,
    ) {
        let Ok(mut runtime) = runtime.try_borrow_mut() else {
            return;
        };
        while exit.get().is_none() {
            let Ok(event) = events.try_recv() else {
                break;
            };
            if let ControlFlow::Break(code) = runtime.handle_event(event) {
                exit.set(Some(code));
                unsafe { PostQuitMessage(code) };
            }
        }
    }

    /// Runs the lens until an exit is requested and returns the exit code.
    pub fn run(settings: &Settings) -> Result<i32> {
        let (event_tx, event_rx) = channel::<MagnifierEvent>();
        if let Ok(mut guard) = EVENT_SENDER.lock() {
            *guard = Some(event_tx);
        }

        let backend = Win32Backend::new(settings)?;
        let mut runtime = MagnifierRuntime::new(backend, settings);
        runtime.start()?;

        let runtime: SharedRuntime = Rc::new(RefCell::new(runtime));
        let events = Rc::new(event_rx);
        let exit = Rc::new(Cell::new(None));

        {
            let runtime = runtime.clone();
            let events = events.clone();
            let exit = exit.clone();
            MODAL_PUMP.with(|pump| {
                *pump.borrow_mut() =
                    Some(Box::new(move || drain_events(&runtime, &events, &exit)));
            });
        }

        let mut msg = MSG::default();
        loop {
            let r = unsafe { GetMessageW(&mut msg, None, 0, 0) };
            if r.0 <= 0 {
                break;
            }
            unsafe {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
            drain_events(&runtime, &events, &exit);
            if exit.get().is_some() {
                break;
            }
        }

        MODAL_PUMP.with(|pump| pump.borrow_mut().take());
        runtime.borrow_mut().shutdown();
        if let Ok(mut guard) = EVENT_SENDER.lock() {
            *guard = None;
        }

        Ok(exit.get().unwrap_or(msg.wParam.0 as i32))
    }

    #[cfg(test)]
    mod windows_tests {
        use super::{colorref, hotkey_modifiers, signed_words};
        use crate::hotkey::Hotkey;
        use windows::Win32::Foundation::LPARAM;
        use windows::Win32::UI::Input::KeyboardAndMouse::{MOD_ALT, MOD_CONTROL, MOD_NOREPEAT};

        #[test]
        fn border_color_packs_as_bgr() {
            assert_eq!(colorref([255, 128, 0]).0, 0x000080ff);
        }

        #[test]
        fn default_hotkey_uses_ctrl_alt_without_repeat() {
            let modifiers = hotkey_modifiers(&Hotkey::default());
            assert_eq!(modifiers, MOD_CONTROL | MOD_ALT | MOD_NOREPEAT);
        }

        #[test]
        fn move_coordinates_are_sign_extended() {
            let lparam = LPARAM((0xffff_i32 as u16 as isize) | ((20_isize) << 16));
            assert_eq!(signed_words(lparam), (-1, 20));
        }
    }
}
