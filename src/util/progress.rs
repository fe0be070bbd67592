//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::time::Duration;

use indicatif::ProgressBar;
use indicatif::ProgressStyle;

/// Factory for the spinners shown while build passes run
pub struct ProgressBars {
    spinner_template: String,
    hide: bool,
}

impl ProgressBars {
    pub fn setup(spinner_template: String, hide: bool) -> Self {
        ProgressBars {
            spinner_template,
            hide,
        }
    }

    pub fn spinner(&self, msg: String) -> ProgressBar {
        if self.hide {
            return ProgressBar::hidden()
        }

        let b = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template(&self.spinner_template) {
            b.set_style(style);
        }
        b.set_message(msg);
        b.enable_steady_tick(Duration::from_millis(100));
        b
    }
}
